//! Shared sandbox for behavioural tests that need isolated directories.

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{Context, Result, eyre};
use tempfile::TempDir;

/// Temporary directory tree with dedicated cache, target, and work
/// directories so scenarios remain isolated.
///
/// The target and work directories exist on creation; the cache directory is
/// left for the code under test to create.
#[derive(Debug)]
pub struct TestSandbox {
    _guard: TempDir,
    cache_dir: Utf8PathBuf,
    target_dir: Utf8PathBuf,
    work_dir: Utf8PathBuf,
}

impl TestSandbox {
    /// Creates a new sandbox under the system temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn new(prefix: &str) -> Result<Self> {
        let guard = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .context("create sandbox tempdir")?;
        let base_dir = Utf8PathBuf::from_path_buf(guard.path().to_path_buf())
            .map_err(|path| eyre!("sandbox path {} is not UTF-8", path.display()))?;
        let cache_dir = base_dir.join("cache");
        let target_dir = base_dir.join("bin");
        let work_dir = base_dir.join("work");
        for dir in [&target_dir, &work_dir] {
            std::fs::create_dir_all(dir).with_context(|| format!("create {dir}"))?;
        }

        Ok(Self {
            _guard: guard,
            cache_dir,
            target_dir,
            work_dir,
        })
    }

    /// Build cache directory; absent until something is cached.
    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    /// Install target directory.
    pub fn target_dir(&self) -> &Utf8Path {
        &self.target_dir
    }

    /// Scratch directory for inputs such as tarballs and put sources.
    pub fn work_dir(&self) -> &Utf8Path {
        &self.work_dir
    }

    /// Reads a UTF-8 file relative to the install target.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_installed(&self, name: &str) -> Result<String> {
        let path = self.target_dir.join(name);
        std::fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }
}
