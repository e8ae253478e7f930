//! Streaming SHA-256 digests of binaries.

use std::fs;
use std::io::Read;

use camino::Utf8Path;
use sha2::{Digest, Sha256};

use crate::error::{BuildErrorKind, BuildResult, ResultKindExt};

/// Computes the SHA-256 digest of a file's contents.
///
/// # Errors
///
/// Returns a [`BuildErrorKind::Filesystem`] error if the file cannot be
/// opened or read.
pub(crate) fn file_digest_bytes(path: &Utf8Path) -> BuildResult<Vec<u8>> {
    let mut hasher = Sha256::new();
    hash_file_contents(path, &mut hasher)?;
    Ok(hasher.finalize().to_vec())
}

/// Computes the SHA-256 digest of a file as lowercase hex.
///
/// # Errors
///
/// Returns a [`BuildErrorKind::Filesystem`] error if the file cannot be
/// opened or read.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use docker_devtools::file_digest;
///
/// let digest = file_digest(Utf8Path::new("bundles/1.12.0/binary-client/docker"))?;
/// assert_eq!(digest.len(), 64);
/// # Ok::<(), docker_devtools::BuildError>(())
/// ```
pub fn file_digest(path: &Utf8Path) -> BuildResult<String> {
    Ok(hex::encode(file_digest_bytes(path)?))
}

/// Hashes file contents using chunked streaming I/O.
#[expect(
    clippy::indexing_slicing,
    reason = "bytes_read is always <= buffer.len()"
)]
fn hash_file_contents(path: &Utf8Path, hasher: &mut Sha256) -> BuildResult<()> {
    let mut file = fs::File::open(path)
        .kind_context(BuildErrorKind::Filesystem, || format!("failed to open file '{path}'"))?;
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file
            .read(&mut buffer)
            .kind_context(BuildErrorKind::Filesystem, || format!("failed to read file '{path}'"))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(())
}
