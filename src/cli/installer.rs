//! `dinstaller`: installs a Docker release from the build cache.

use std::ffi::OsString;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use color_eyre::eyre::eyre;
use tracing::info;

use crate::cache::BuildCache;
use crate::config::DevtoolsEnvCfg;
use crate::error::{ConfigError, Result};
use crate::observability::CLI_TARGET;
use crate::version::Version;

/// Placeholder version naming the unsupported experimental channel.
const LATEST: &str = "latest";

/// Single-dash flag spellings accepted from older scripts, with the long flag
/// each one stands for.
const SINGLE_DASH_FLAGS: [(&str, &str); 2] = [("-bc", "--build-cache"), ("-cc", "--check-cache")];

/// Arguments accepted by `dinstaller`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dinstaller",
    version,
    about = "Install a Docker release from the local build cache, downloading it when missing"
)]
pub struct InstallerArgs {
    /// Directory to install binaries into [default: $HOME/.bin].
    #[arg(short = 't', long = "target", value_name = "DIR")]
    pub target: Option<Utf8PathBuf>,

    /// Directory caching downloaded builds (also `-bc`).
    #[arg(long = "build-cache", visible_alias = "bc", value_name = "DIR")]
    pub build_cache: Option<Utf8PathBuf>,

    /// Only report whether the version is cached (also `-cc`).
    #[arg(long = "check-cache", visible_alias = "cc")]
    pub check_cache: bool,

    /// Put FILE into the cache under VERSION before installing.
    #[arg(long = "put", value_name = "FILE")]
    pub put: Option<Utf8PathBuf>,

    /// Enable debug logging.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Version to install, e.g. `1.9.1`, `17.03.0-ce` or `1.10.0-dev@a1b2c3d`.
    #[arg(value_name = "VERSION", default_value = LATEST)]
    pub release: String,
}

impl InstallerArgs {
    /// Parses `args`, accepting the single-dash `-bc` and `-cc` spellings.
    ///
    /// Exits the process with usage information when parsing fails, like
    /// [`Parser::parse_from`].
    pub fn parse_with_single_dash_flags<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(expand_single_dash_flags(args))
    }

    /// Parses the requested version.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for `latest`, whose experimental builds
    /// cannot be installed, and a parse error for malformed versions.
    pub fn requested_version(&self) -> Result<Version> {
        if self.release == LATEST {
            return Err(ConfigError::from(eyre!("experimental build installs not supported")).into());
        }
        Ok(Version::parse(&self.release)?)
    }
}

/// Rewrites `-bc`, `-bc=DIR` and `-cc` to their long forms.
///
/// Arguments after a `--` separator are passed through unchanged.
pub fn expand_single_dash_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut positional = false;
    args.into_iter()
        .map(|arg| {
            let arg = arg.into();
            if positional {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                positional = true;
                return arg;
            }
            SINGLE_DASH_FLAGS
                .iter()
                .find_map(|&(short, long)| {
                    let rest = text.strip_prefix(short)?;
                    (rest.is_empty() || rest.starts_with('='))
                        .then(|| OsString::from(format!("{long}{rest}")))
                })
                .unwrap_or(arg)
        })
        .collect()
}

/// Result of a successful `dinstaller` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The version was installed into the target directory.
    Installed,
    /// `--check-cache` found the version in the cache.
    Cached,
    /// `--check-cache` did not find the version in the cache.
    Uncached,
}

impl InstallOutcome {
    /// Line printed on stdout for cache checks.
    #[must_use]
    pub const fn report(self) -> Option<&'static str> {
        match self {
            Self::Installed => None,
            Self::Cached => Some("cached"),
            Self::Uncached => Some("uncached"),
        }
    }

    /// Whether the run counts as a success; an uncached check does not.
    #[must_use]
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Uncached)
    }

    /// Process exit code matching [`Self::is_success`].
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Runs `dinstaller` against the HTTP-backed cache described by `cfg`.
///
/// # Errors
///
/// Returns an error if the version is invalid, the target directory cannot
/// be resolved, or the install fails.
pub fn run_installer(args: &InstallerArgs, cfg: &DevtoolsEnvCfg) -> Result<InstallOutcome> {
    let version = args.requested_version()?;
    let cache = cfg.build_cache(args.build_cache.as_deref())?;

    if args.check_cache {
        return Ok(if cache.is_cached(&version) {
            InstallOutcome::Cached
        } else {
            InstallOutcome::Uncached
        });
    }

    let target = cfg.target_dir(args.target.as_deref())?;
    install_version(&cache, &version, args.put.as_deref(), &target)?;
    Ok(InstallOutcome::Installed)
}

/// Installs `version` from `cache` into `target`, first putting `put` into
/// the cache when given.
///
/// `target` is created when missing.
///
/// # Errors
///
/// Returns the cache's error when the put or install fails.
pub fn install_version<C>(
    cache: &C,
    version: &Version,
    put: Option<&Utf8Path>,
    target: &Utf8Path,
) -> Result<()>
where
    C: BuildCache + ?Sized,
{
    if let Some(source) = put {
        info!(
            target: CLI_TARGET,
            version = %version,
            source = %source,
            "putting file into build cache"
        );
        cache.put(version, source)?;
    }

    info!(
        target: CLI_TARGET,
        version = %version,
        target_dir = %target,
        "installing"
    );
    cache.install(version, target)?;
    info!(target: CLI_TARGET, version = %version, "installed");
    Ok(())
}
