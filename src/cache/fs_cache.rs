//! Build cache stored in a flat local directory.

use std::fs;
use std::io::{self, Read, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use super::BuildCache;
use super::fetch::{Fetcher, HttpFetcher};
use super::install::{
    LEGACY_BINARY_NAME, init_companion_path, install_legacy, install_multi_binary,
    remove_stale_companion,
};
use crate::copy::{BINARY_MODE, copy_file, file_digest_bytes};
use crate::error::{BuildError, BuildErrorKind, BuildResult, ResultKindExt};
use crate::observability::CACHE_TARGET;
use crate::version::{Platform, Version};

/// Prefix of download staging files inside the cache root.
const STAGING_PREFIX: &str = "tmp-";

/// [`BuildCache`] keeping one file per version in a flat directory.
///
/// Entries are named by commit for commit builds and by
/// `{major}.{minor}.{patch}[-{tag}]` for releases. Downloads are staged in a
/// `tmp-*` file inside the root and renamed into place, so a partially
/// written entry is never visible under its final name.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use docker_devtools::{BuildCache, FsBuildCache, Version};
///
/// let cache = FsBuildCache::new("/home/user/.cache/docker-devtools/builds")?;
/// let version = Version::parse("17.03.0-ce")?;
/// cache.install(&version, Utf8Path::new("/home/user/.bin"))?;
/// # Ok::<(), docker_devtools::BuildError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FsBuildCache<F = HttpFetcher> {
    root: Utf8PathBuf,
    fetcher: F,
    platform: Platform,
}

impl FsBuildCache<HttpFetcher> {
    /// Creates a cache rooted at `root` that downloads over HTTP.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildErrorKind::Transport`] error if the HTTP client cannot
    /// be initialised.
    pub fn new(root: impl Into<Utf8PathBuf>) -> BuildResult<Self> {
        Ok(Self::with_fetcher(root, HttpFetcher::new()?))
    }
}

impl<F: Fetcher> FsBuildCache<F> {
    /// Creates a cache rooted at `root` using `fetcher` for downloads.
    pub fn with_fetcher(root: impl Into<Utf8PathBuf>, fetcher: F) -> Self {
        Self {
            root: root.into(),
            fetcher,
            platform: Platform::host(),
        }
    }

    /// Selects the platform whose releases are downloaded.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Root directory of the cache.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Fetcher used for downloads.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Path at which `version` is stored, whether or not it exists yet.
    #[must_use]
    pub fn entry_path(&self, version: &Version) -> Utf8PathBuf {
        self.root.join(version.cache_key())
    }

    fn lookup(&self, version: &Version) -> Option<Utf8PathBuf> {
        debug!(
            target: CACHE_TARGET,
            version = %version,
            "looking for cached version"
        );
        let entry = self.entry_path(version);
        if entry.is_file() {
            debug!(target: CACHE_TARGET, path = %entry, "cache hit");
            Some(entry)
        } else {
            debug!(target: CACHE_TARGET, path = %entry, "cache miss");
            None
        }
    }

    /// Downloads `version` and moves it into its cache slot.
    fn download(&self, version: &Version) -> BuildResult<Utf8PathBuf> {
        let url = version.download_url(&self.platform).ok_or_else(|| {
            BuildError::msg(
                BuildErrorKind::UnsupportedVersionFormat,
                format!(
                    "no download location for {version} on {}/{}",
                    self.platform.os(),
                    self.platform.arch()
                ),
            )
        })?;
        debug!(target: CACHE_TARGET, url = %url, "downloading");
        let mut body = self.fetcher.fetch(&url)?;

        fs::create_dir_all(&self.root).kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to create cache directory {}", self.root)
        })?;
        let mut staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&self.root)
            .kind_context(BuildErrorKind::Filesystem, || {
                format!("failed to create staging file in {}", self.root)
            })?;
        debug!(
            target: CACHE_TARGET,
            staging = %staged.path().display(),
            "copying download to staging file"
        );
        let bytes = stage_body(&mut body, staged.as_file_mut(), &url)?;

        let entry = self.entry_path(version);
        staged
            .persist(&entry)
            .map_err(|err| err.error)
            .kind_context(BuildErrorKind::Filesystem, || {
                format!("failed to move download into {entry}")
            })?;
        remove_stale_companion(&entry)?;

        debug!(
            target: CACHE_TARGET,
            path = %entry,
            bytes,
            "saved download"
        );
        Ok(entry)
    }
}

/// Streams a download body into `staged`.
///
/// Read failures are [`BuildErrorKind::Transport`] errors; write failures are
/// [`BuildErrorKind::Filesystem`] errors.
pub(super) fn stage_body<R, W>(body: &mut R, staged: W, url: &str) -> BuildResult<u64>
where
    R: Read + ?Sized,
    W: Write,
{
    let mut writer = TrackedWriter {
        inner: staged,
        failed: false,
    };
    match io::copy(body, &mut writer) {
        Ok(bytes) => Ok(bytes),
        Err(err) if writer.failed => Err(err).kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to write download of {url} to staging file")
        }),
        Err(err) => {
            Err(err).kind_context(BuildErrorKind::Transport, || format!("failed to download {url}"))
        }
    }
}

/// Writer recording whether any write to `inner` failed.
struct TrackedWriter<W> {
    inner: W,
    failed: bool,
}

impl<W: Write> Write for TrackedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf);
        self.failed |= written.is_err();
        written
    }

    fn flush(&mut self) -> io::Result<()> {
        let flushed = self.inner.flush();
        self.failed |= flushed.is_err();
        flushed
    }
}

impl<F: Fetcher> BuildCache for FsBuildCache<F> {
    fn is_cached(&self, version: &Version) -> bool {
        self.lookup(version).is_some()
    }

    fn put(&self, version: &Version, source: &Utf8Path) -> BuildResult<()> {
        let cached = match self.lookup(version) {
            Some(existing) => {
                if file_digest_bytes(source)? == file_digest_bytes(&existing)? {
                    debug!(
                        target: CACHE_TARGET,
                        version = %version,
                        "cached content already matches source"
                    );
                    return Ok(());
                }
                debug!(
                    target: CACHE_TARGET,
                    cached = %existing,
                    source = %source,
                    "overwriting cached version"
                );
                existing
            }
            None => self.entry_path(version),
        };

        copy_file(source, &cached, BINARY_MODE)?;
        let source_init = init_companion_path(source);
        if source_init.is_file() {
            copy_file(&source_init, &init_companion_path(&cached), BINARY_MODE)
        } else {
            remove_stale_companion(&cached)
        }
    }

    fn install(&self, version: &Version, target: &Utf8Path) -> BuildResult<()> {
        let cached = match self.lookup(version) {
            Some(entry) => entry,
            None if version.commit().is_some() => {
                return Err(BuildError::msg(
                    BuildErrorKind::CannotDownloadByCommit,
                    format!("cannot download build by commit: {version}"),
                ));
            }
            None => self.download(version)?,
        };

        if version.is_legacy_release() {
            debug!(
                target: CACHE_TARGET,
                version = %version,
                "installing single-binary version"
            );
            return install_legacy(&cached, &target.join(LEGACY_BINARY_NAME));
        }

        debug!(
            target: CACHE_TARGET,
            version = %version,
            "installing multi-binary version"
        );
        install_multi_binary(&cached, target)
    }
}
