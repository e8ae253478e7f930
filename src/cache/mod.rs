//! Local cache of Docker release builds.
//!
//! This module avoids repeated downloads of Docker releases: each version is
//! fetched once, stored under a key derived from its number and tag (or its
//! commit), and installed from there on later requests.
//!
//! # Cache Location
//!
//! The cache directory is resolved in the following order:
//!
//! 1. `DOCKER_BUILD_CACHE_DIR` environment variable if set
//! 2. `$XDG_CACHE_HOME/docker-devtools/builds` if `XDG_CACHE_HOME` is set
//! 3. `~/.cache/docker-devtools/builds` as fallback
//!
//! # Concurrency
//!
//! There is no locking. Downloads are published by rename, so readers never
//! observe a partial entry, but concurrent writers of the same version race
//! and the last rename wins.

mod config;
mod fetch;
mod fs_cache;
mod install;

use camino::Utf8Path;

use crate::error::BuildResult;
use crate::version::Version;

pub use config::{CACHE_DIR_ENV, resolve_cache_dir};
pub use fetch::{Fetcher, HttpFetcher};
pub use fs_cache::FsBuildCache;
pub use install::init_companion_path;

/// A store of Docker builds addressed by [`Version`].
pub trait BuildCache {
    /// Returns whether the version exists in the cache.
    fn is_cached(&self, version: &Version) -> bool;

    /// Puts the file at `source` in the cache under `version`.
    ///
    /// Putting identical content again is a no-op. An init companion next
    /// to `source` is stored alongside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the cache entry
    /// cannot be written.
    fn put(&self, version: &Version, source: &Utf8Path) -> BuildResult<()>;

    /// Installs `version` into the directory `target`, downloading it first
    /// when it is not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be retrieved or installed.
    /// A failed install may leave some binaries already copied.
    fn install(&self, version: &Version, target: &Utf8Path) -> BuildResult<()>;
}
