//! Install strategies for cached Docker releases.
//!
//! Releases before 1.11.0-rc1 are a single `docker` binary, optionally with
//! a `dockerinit` companion. Later releases are gzip tarballs holding every
//! binary under a top-level `docker/` directory.

use std::fs::{self, File, OpenOptions};
use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::copy::{BINARY_MODE, copy_file};
use crate::error::{BuildError, BuildErrorKind, BuildResult, ResultKindExt};
use crate::observability::CACHE_TARGET;

/// File name of the binary installed by the legacy strategy.
pub(crate) const LEGACY_BINARY_NAME: &str = "docker";

/// Directory inside release tarballs holding the binaries.
const ARCHIVE_BINARY_DIR: &str = "docker";

/// Returns the path of the init companion shipped next to `binary`.
///
/// `docker*` names become `dockerinit*`; anything else gains `-init`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use docker_devtools::cache::init_companion_path;
///
/// assert_eq!(init_companion_path(Utf8Path::new("/bin/docker")), "/bin/dockerinit");
/// assert_eq!(init_companion_path(Utf8Path::new("cache/1.9.0")), "cache/1.9.0-init");
/// ```
#[must_use]
pub fn init_companion_path(binary: &Utf8Path) -> Utf8PathBuf {
    let name = binary.file_name().unwrap_or_default();
    let companion = name.strip_prefix("docker").map_or_else(
        || format!("{name}-init"),
        |rest| format!("dockerinit{rest}"),
    );
    binary.with_file_name(companion)
}

/// Installs a single-binary release at `target`.
///
/// The cached init companion is installed next to it when present.
/// Otherwise a stale companion at the target is truncated in place: the
/// caller may only be allowed to write that file, not its directory, and
/// later installs must still be able to overwrite it.
pub(crate) fn install_legacy(cached: &Utf8Path, target: &Utf8Path) -> BuildResult<()> {
    copy_file(cached, target, BINARY_MODE)?;

    let cached_init = init_companion_path(cached);
    let target_init = init_companion_path(target);
    if cached_init.is_file() {
        return copy_file(&cached_init, &target_init, BINARY_MODE);
    }

    if target_init.exists() {
        debug!(
            target: CACHE_TARGET,
            path = %target_init,
            "truncating stale init companion"
        );
        OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&target_init)
            .kind_context(BuildErrorKind::Filesystem, || {
                format!("failed to truncate {target_init}")
            })?;
    }
    Ok(())
}

/// Installs every top-level binary of a release tarball into `target_dir`.
///
/// The tarball is unpacked into a scratch directory that is removed when
/// this function returns, whether or not the install succeeded.
pub(crate) fn install_multi_binary(archive: &Utf8Path, target_dir: &Utf8Path) -> BuildResult<()> {
    let scratch = tempfile::Builder::new()
        .prefix("docker-install-")
        .tempdir()
        .kind_context(BuildErrorKind::Filesystem, || {
            "failed to create scratch directory"
        })?;
    let scratch_root = Utf8Path::from_path(scratch.path()).ok_or_else(|| {
        BuildError::msg(
            BuildErrorKind::Filesystem,
            format!("scratch directory {} is not UTF-8", scratch.path().display()),
        )
    })?;

    extract_tarball(archive, scratch_root)?;
    copy_top_level_files(&scratch_root.join(ARCHIVE_BINARY_DIR), target_dir)?;

    let scratch_path = scratch.path().to_path_buf();
    if let Err(err) = scratch.close() {
        warn!(
            target: CACHE_TARGET,
            path = %scratch_path.display(),
            error = %err,
            "failed to remove scratch directory"
        );
    }
    Ok(())
}

fn extract_tarball(archive: &Utf8Path, dest: &Utf8Path) -> BuildResult<()> {
    debug!(
        target: CACHE_TARGET,
        archive = %archive,
        dest = %dest,
        "extracting release tarball"
    );
    let file = File::open(archive)
        .kind_context(BuildErrorKind::Filesystem, || format!("failed to open {archive}"))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    tarball.set_preserve_permissions(true);
    tarball
        .unpack(dest)
        .kind_context(BuildErrorKind::Archive, || format!("error untarring {archive}"))
}

fn copy_top_level_files(bin_root: &Utf8Path, target_dir: &Utf8Path) -> BuildResult<()> {
    let entries = bin_root
        .read_dir_utf8()
        .kind_context(BuildErrorKind::Archive, || {
            format!("release archive has no {ARCHIVE_BINARY_DIR}/ directory")
        })?;
    let mut files = Vec::new();
    for dir_entry in entries {
        let entry = dir_entry.kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to read entry in {bin_root}")
        })?;
        let file_type = entry.file_type().kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to stat {}", entry.path())
        })?;
        if file_type.is_dir() {
            debug!(
                target: CACHE_TARGET,
                name = %entry.file_name(),
                "skipping installation of directory"
            );
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort();

    for source in files {
        if !source.is_file() {
            debug!(
                target: CACHE_TARGET,
                path = %source,
                "skipping non-regular archive entry"
            );
            continue;
        }
        let Some(name) = source.file_name() else {
            continue;
        };
        let destination = target_dir.join(name);
        debug!(
            target: CACHE_TARGET,
            name = %name,
            destination = %destination,
            "installing binary"
        );
        copy_file(&source, &destination, BINARY_MODE)?;
    }
    Ok(())
}

/// Removes an init companion left beside a cache entry that was replaced.
pub(crate) fn remove_stale_companion(entry: &Utf8Path) -> BuildResult<()> {
    let companion = init_companion_path(entry);
    match fs::remove_file(&companion) {
        Ok(()) => {
            debug!(
                target: CACHE_TARGET,
                path = %companion,
                "removed stale init companion"
            );
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to remove {companion}")
        }),
    }
}
