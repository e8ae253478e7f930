//! `bundleinstaller`: copies binaries out of Docker build bundles.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use clap::Parser;
use tracing::info;

use crate::copy::copy_bundle_binaries;
use crate::error::{BuildError, BuildErrorKind, BuildResult, Result, ResultKindExt};
use crate::observability::CLI_TARGET;

/// Arguments accepted by `bundleinstaller`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bundleinstaller",
    version,
    about = "Copy the binaries of one or more Docker build bundles into a directory"
)]
pub struct BundleArgs {
    /// Bundle directories followed by the target directory.
    #[arg(
        value_name = "BUNDLE_DIR... TARGET_DIR",
        num_args = 2..,
        required = true
    )]
    pub paths: Vec<Utf8PathBuf>,

    /// Enable debug logging.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl BundleArgs {
    /// Splits the positional paths into bundle directories and the target.
    #[must_use]
    pub fn split(&self) -> Option<(&[Utf8PathBuf], &Utf8Path)> {
        let (target, bundles) = self.paths.split_last()?;
        if bundles.is_empty() {
            return None;
        }
        Some((bundles, target.as_path()))
    }
}

/// Copies every bundle named in `args` into the target directory, in order,
/// stopping at the first failure.
///
/// # Errors
///
/// Returns an error if a path cannot be resolved or a bundle copy fails.
pub fn run_bundle_installer(args: &BundleArgs) -> Result<()> {
    let Some((bundles, target)) = args.split() else {
        return Err(BuildError::msg(
            BuildErrorKind::Other,
            "expecting source and target directory",
        )
        .into());
    };
    let target_dir = absolute_clean(target)?;

    for bundle in bundles {
        let bundle_dir = absolute_clean(bundle)?;
        info!(
            target: CLI_TARGET,
            bundle = %bundle_dir,
            target_dir = %target_dir,
            "copying bundle binaries"
        );
        copy_bundle_binaries(&bundle_dir, &target_dir).map_err(|err| {
            let kind = err.kind();
            BuildError::new(
                kind,
                err.into_report()
                    .wrap_err(format!("error copying binaries from {bundle_dir}")),
            )
        })?;
    }
    Ok(())
}

/// Resolves `path` against the working directory and removes `.` and `..`
/// components lexically.
///
/// # Errors
///
/// Returns a [`BuildErrorKind::Filesystem`] error if the working directory
/// cannot be read or is not UTF-8.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use docker_devtools::cli::absolute_clean;
///
/// let path = absolute_clean(Utf8Path::new("/opt/./bundles/../bin"))?;
/// assert_eq!(path, "/opt/bin");
/// # Ok::<(), docker_devtools::BuildError>(())
/// ```
pub fn absolute_clean(path: &Utf8Path) -> BuildResult<Utf8PathBuf> {
    let absolute = std::path::absolute(path).kind_context(BuildErrorKind::Filesystem, || {
        format!("error resolving directory {path}")
    })?;
    let absolute = Utf8PathBuf::from_path_buf(absolute).map_err(|raw| {
        BuildError::msg(
            BuildErrorKind::Filesystem,
            format!("resolved path {} is not UTF-8", raw.display()),
        )
    })?;

    let mut clean = Utf8PathBuf::new();
    for component in absolute.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other),
        }
    }
    Ok(clean)
}
