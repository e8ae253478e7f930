//! Builds release tarballs shaped like Docker's static downloads.

use std::fs::File;
use std::io;

use camino::Utf8Path;
use color_eyre::eyre::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{EntryType, Header};

/// Writes a gzip tarball at `path` containing `entries`.
///
/// Each entry is a `(path, contents)` pair; a path ending in `/` creates a
/// directory and ignores its contents. Files are stored with mode `0755`.
///
/// # Errors
///
/// Returns an error if the archive cannot be written.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use docker_devtools::test_support::write_release_tarball;
///
/// let temp = tempfile::tempdir()?;
/// let path = Utf8PathBuf::from_path_buf(temp.path().join("17.3.0-ce"))
///     .map_err(|_| color_eyre::eyre::eyre!("non UTF-8 temp dir"))?;
/// write_release_tarball(&path, &[("docker/", b""), ("docker/dockerd", b"daemon")])?;
/// assert!(path.is_file());
/// # Ok::<(), color_eyre::Report>(())
/// ```
pub fn write_release_tarball(path: &Utf8Path, entries: &[(&str, &[u8])]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create tarball {path}"))?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for &(name, contents) in entries {
        let mut header = Header::new_gnu();
        if name.ends_with('/') {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder
                .append_data(&mut header, name, io::empty())
                .with_context(|| format!("append directory {name}"))?;
        } else {
            header.set_entry_type(EntryType::Regular);
            header.set_mode(0o755);
            header.set_size(u64::try_from(contents.len()).context("entry size")?);
            builder
                .append_data(&mut header, name, contents)
                .with_context(|| format!("append file {name}"))?;
        }
    }

    builder
        .into_inner()
        .context("finish tar stream")?
        .finish()
        .context("finish gzip stream")?;
    Ok(())
}
