//! File copy and bundle verification helpers.
//!
//! [`copy_file`] places a single binary, creating parent directories as
//! needed. [`copy_bundle_binaries`] copies the binaries a Docker build leaves
//! in `bundles/<version>/<binarydir>/`, verifying each against its
//! `.sha256` sidecar.

mod digest;

use std::fs::{self, OpenOptions};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::{BuildError, BuildErrorKind, BuildResult, ResultKindExt};
use crate::observability::COPY_TARGET;

pub use digest::file_digest;
pub(crate) use digest::file_digest_bytes;

/// Permission bits applied to installed binaries.
pub const BINARY_MODE: u32 = 0o755;

/// Extension of checksum sidecar files produced by Docker builds.
const CHECKSUM_EXTENSION: &str = "sha256";

/// Copies `source` into `dest`, creating missing parent directories.
///
/// The destination is truncated if it exists and created with `mode`
/// otherwise.
///
/// # Errors
///
/// Returns a [`BuildErrorKind::Filesystem`] error naming the failing side:
/// a missing source, an uncreatable destination, or a failed copy.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use docker_devtools::copy_file;
///
/// copy_file(
///     Utf8Path::new("/tmp/build/docker"),
///     Utf8Path::new("/home/user/.bin/docker"),
///     0o755,
/// )?;
/// # Ok::<(), docker_devtools::BuildError>(())
/// ```
pub fn copy_file(source: &Utf8Path, dest: &Utf8Path, mode: u32) -> BuildResult<()> {
    if !source.exists() {
        return Err(BuildError::msg(
            BuildErrorKind::Filesystem,
            format!("source file not found at {source:?}"),
        ));
    }

    if let Some(parent) = dest.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs::create_dir_all(parent).kind_context(BuildErrorKind::Filesystem, || {
            format!("error creating directory for {dest:?}")
        })?;
    }

    let mut target = open_truncated(dest, mode).kind_context(BuildErrorKind::Filesystem, || {
        format!("error opening target file {dest:?}")
    })?;
    let mut reader = fs::File::open(source).kind_context(BuildErrorKind::Filesystem, || {
        format!("error opening source file {source:?}")
    })?;
    let copied = io::copy(&mut reader, &mut target).kind_context(BuildErrorKind::Filesystem, || {
        format!("error copying {source:?} to {dest:?}")
    })?;

    debug!(
        target: COPY_TARGET,
        source = %source,
        dest = %dest,
        bytes = copied,
        "copied file"
    );
    Ok(())
}

#[cfg(unix)]
fn open_truncated(path: &Utf8Path, mode: u32) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_truncated(path: &Utf8Path, _mode: u32) -> io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Copies the binaries of a Docker build bundle directory into `target`.
///
/// Every `NAME.sha256` sidecar in `source` names a binary `NAME`. When
/// `source` follows the `bundles/<version>/<binarydir>` layout the
/// `-<version>` suffix is stripped from the installed name. Each copied
/// binary is checked against the digest recorded in its sidecar.
///
/// # Errors
///
/// Returns [`BuildErrorKind::HashMismatch`] when a copied binary disagrees
/// with its sidecar, and [`BuildErrorKind::Filesystem`] when the directory
/// cannot be read or a binary cannot be copied.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use docker_devtools::copy_bundle_binaries;
///
/// copy_bundle_binaries(
///     Utf8Path::new("/go/src/github.com/docker/docker/bundles/1.12.0/binary-client"),
///     Utf8Path::new("/home/user/.bin"),
/// )?;
/// # Ok::<(), docker_devtools::BuildError>(())
/// ```
pub fn copy_bundle_binaries(source: &Utf8Path, target: &Utf8Path) -> BuildResult<()> {
    let suffix = version_suffix(source);
    for sidecar in checksum_sidecars(source)? {
        let Some(name) = sidecar
            .file_name()
            .and_then(|file| file.strip_suffix(".sha256"))
        else {
            continue;
        };
        let target_name = suffix
            .as_deref()
            .and_then(|suffix| name.strip_suffix(suffix))
            .filter(|stripped| !stripped.is_empty())
            .unwrap_or(name);
        copy_binary(source, name, &target.join(target_name)).map_err(|err| {
            let kind = err.kind();
            BuildError::new(kind, err.into_report().wrap_err("copy failed"))
        })?;
    }
    Ok(())
}

/// Lists checksum sidecars in `dir`, sorted by name.
fn checksum_sidecars(dir: &Utf8Path) -> BuildResult<Vec<Utf8PathBuf>> {
    let entries = dir
        .read_dir_utf8()
        .kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to read bundle directory {dir}")
        })?;
    let mut sidecars = Vec::new();
    for dir_entry in entries {
        let entry = dir_entry.kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to read entry in {dir}")
        })?;
        if entry.path().extension() == Some(CHECKSUM_EXTENSION) {
            sidecars.push(entry.into_path());
        }
    }
    sidecars.sort();
    Ok(sidecars)
}

/// Returns `-<version>` when `source` is `*/bundles/<version>/<binarydir>`.
fn version_suffix(source: &Utf8Path) -> Option<String> {
    let version_dir = source.parent()?;
    let version = version_dir.file_name()?;
    let bundles = version_dir.parent()?.file_name()?;
    (bundles == "bundles").then(|| format!("-{version}"))
}

fn copy_binary(source_dir: &Utf8Path, name: &str, dest: &Utf8Path) -> BuildResult<()> {
    let source = source_dir.join(name);
    if !source.is_file() {
        return Err(BuildError::msg(
            BuildErrorKind::Filesystem,
            format!("missing file {source}"),
        ));
    }
    copy_file(&source, dest, BINARY_MODE)?;

    let sidecar = source_dir.join(format!("{name}.{CHECKSUM_EXTENSION}"));
    match fs::read_to_string(&sidecar) {
        Ok(contents) => verify_checksum(dest, &contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to read checksum {sidecar}")
        }),
    }
}

/// Compares the digest of `file` with the first token of a sidecar.
fn verify_checksum(file: &Utf8Path, sidecar: &str) -> BuildResult<()> {
    let recorded = sidecar
        .split_once(' ')
        .map_or(sidecar, |(token, _)| token)
        .trim();
    let expected = hex::decode(recorded).kind_context(BuildErrorKind::HashMismatch, || {
        format!("invalid checksum {recorded:?} for {file}")
    })?;
    let actual = file_digest_bytes(file)?;
    if expected != actual {
        return Err(BuildError::msg(
            BuildErrorKind::HashMismatch,
            format!(
                "hash mismatch for {file}: expected {recorded}, found {}",
                hex::encode(&actual)
            ),
        ));
    }
    debug!(
        target: COPY_TARGET,
        file = %file,
        digest = %recorded,
        "checksum verified"
    );
    Ok(())
}
