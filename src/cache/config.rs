//! Location of the build cache on disk.

use camino::Utf8PathBuf;

/// Path of the cache below a user cache directory.
const CACHE_SUBDIR: &str = "docker-devtools/builds";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "DOCKER_BUILD_CACHE_DIR";

/// Resolves the default build cache directory.
///
/// The first candidate that is set, non-blank, and valid UTF-8 wins:
///
/// 1. `$DOCKER_BUILD_CACHE_DIR`
/// 2. `$XDG_CACHE_HOME/docker-devtools/builds`
/// 3. `~/.cache/docker-devtools/builds`
/// 4. `/tmp/docker-devtools/builds`
///
/// # Examples
///
/// ```
/// use docker_devtools::cache::resolve_cache_dir;
///
/// let cache_dir = resolve_cache_dir();
/// assert!(cache_dir.is_absolute() || std::env::var_os("DOCKER_BUILD_CACHE_DIR").is_some());
/// ```
#[must_use]
pub fn resolve_cache_dir() -> Utf8PathBuf {
    env_dir(CACHE_DIR_ENV)
        .or_else(|| env_dir("XDG_CACHE_HOME").map(|xdg| xdg.join(CACHE_SUBDIR)))
        .or_else(|| {
            let home = Utf8PathBuf::from_path_buf(dirs::home_dir()?).ok()?;
            Some(home.join(".cache").join(CACHE_SUBDIR))
        })
        .unwrap_or_else(|| Utf8PathBuf::from("/tmp").join(CACHE_SUBDIR))
}

/// Reads a directory from `key`, ignoring blank values.
fn env_dir(key: &str) -> Option<Utf8PathBuf> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| Utf8PathBuf::from(trimmed))
}
