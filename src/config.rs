//! Environment-backed settings shared by the command-line front ends.

use std::ffi::OsString;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::eyre;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::cache::{FsBuildCache, HttpFetcher, resolve_cache_dir};
use crate::error::{BuildResult, ConfigError, ConfigResult};
use crate::version::Platform;

/// Directory under `$HOME` receiving installed binaries by default.
const DEFAULT_TARGET_SUBDIR: &str = ".bin";

/// Captures tool settings supplied via `DOCKER_DEVTOOLS_*` environment
/// variables.
///
/// Every field is optional; unset values fall back to the defaults exposed
/// by the accessor methods.
///
/// # Examples
/// ```
/// use docker_devtools::DevtoolsEnvCfg;
///
/// let cfg = DevtoolsEnvCfg::default();
/// assert!(cfg.download_timeout().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, OrthoConfig, Default)]
#[ortho_config(prefix = "DOCKER_DEVTOOLS")]
pub struct DevtoolsEnvCfg {
    /// Directory holding cached Docker builds.
    pub cache_dir: Option<Utf8PathBuf>,
    /// Directory receiving installed binaries.
    pub target_dir: Option<Utf8PathBuf>,
    /// Operating system whose releases are downloaded, e.g. `linux`.
    pub os: Option<String>,
    /// Architecture whose releases are downloaded, e.g. `x86_64`.
    pub arch: Option<String>,
    /// Seconds before a download request is abandoned.
    pub download_timeout_secs: Option<u64>,
}

impl DevtoolsEnvCfg {
    /// Loads configuration from environment variables without parsing CLI
    /// arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable holds a value of the wrong
    /// type.
    pub fn load() -> ConfigResult<Self> {
        let args = [OsString::from("docker-devtools")];
        Self::load_from_iter(args).map_err(|err| ConfigError::from(eyre!(err)))
    }

    /// Cache directory, preferring `override_dir`, then the configured
    /// value, then [`resolve_cache_dir`].
    #[must_use]
    pub fn cache_dir(&self, override_dir: Option<&Utf8Path>) -> Utf8PathBuf {
        override_dir
            .map(Utf8Path::to_path_buf)
            .or_else(|| self.cache_dir.clone())
            .unwrap_or_else(resolve_cache_dir)
    }

    /// Install directory, preferring `override_dir`, then the configured
    /// value, then `$HOME/.bin`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when no directory is configured and the home
    /// directory cannot be determined.
    pub fn target_dir(&self, override_dir: Option<&Utf8Path>) -> ConfigResult<Utf8PathBuf> {
        if let Some(dir) = override_dir
            .map(Utf8Path::to_path_buf)
            .or_else(|| self.target_dir.clone())
        {
            return Ok(dir);
        }
        let home = dirs::home_dir().ok_or_else(|| eyre!("cannot determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|path| eyre!("home directory {} is not UTF-8", path.display()))?;
        Ok(home.join(DEFAULT_TARGET_SUBDIR))
    }

    /// Platform whose releases are downloaded.
    ///
    /// Unset fields fall back to the host's values.
    #[must_use]
    pub fn platform(&self) -> Platform {
        let host = Platform::host();
        match (&self.os, &self.arch) {
            (None, None) => host,
            (os, arch) => Platform::new(
                os.as_deref().unwrap_or_else(|| host.os()),
                arch.as_deref().unwrap_or_else(|| host.arch()),
            ),
        }
    }

    /// Request timeout for downloads, if configured.
    #[must_use]
    pub fn download_timeout(&self) -> Option<Duration> {
        self.download_timeout_secs.map(Duration::from_secs)
    }

    /// Opens the HTTP-backed build cache described by these settings.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::BuildErrorKind::Transport`] error if the HTTP
    /// client cannot be initialised.
    pub fn build_cache(&self, override_dir: Option<&Utf8Path>) -> BuildResult<FsBuildCache> {
        let fetcher = HttpFetcher::with_timeout(self.download_timeout())?;
        Ok(FsBuildCache::with_fetcher(self.cache_dir(override_dir), fetcher)
            .with_platform(self.platform()))
    }
}
