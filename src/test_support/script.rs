//! Fake executables standing in for installed Docker binaries.

use std::fs;
use std::os::unix::fs::PermissionsExt;

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{Context, Result};

/// Writes an executable shell script at `dir/name` that prints `stdout`,
/// writes `stderr` to standard error, and exits with `status`.
///
/// # Errors
///
/// Returns an error if the script cannot be written or made executable.
pub fn write_fake_binary(
    dir: &Utf8Path,
    name: &str,
    stdout: &str,
    stderr: &str,
    status: i32,
) -> Result<Utf8PathBuf> {
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' '{}'\nprintf '%s\\n' '{}' >&2\nexit {status}\n",
        escape_single_quotes(stdout),
        escape_single_quotes(stderr),
    );
    fs::write(&path, script).with_context(|| format!("write fake binary {path}"))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod fake binary {path}"))?;
    Ok(path)
}

/// Writes a fake `docker` whose `--version` output reports `version` built
/// from `commit`.
///
/// # Errors
///
/// Returns an error if the script cannot be written.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use docker_devtools::binary_version;
/// use docker_devtools::test_support::write_fake_docker;
///
/// let temp = tempfile::tempdir()?;
/// let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
///     .map_err(|_| color_eyre::eyre::eyre!("non UTF-8 temp dir"))?;
/// let docker = write_fake_docker(&dir, "17.03.0-ce", "60ccb22")?;
/// let version = binary_version(&docker)?;
/// assert_eq!(version.commit(), Some("60ccb22"));
/// # Ok::<(), color_eyre::Report>(())
/// ```
pub fn write_fake_docker(dir: &Utf8Path, version: &str, commit: &str) -> Result<Utf8PathBuf> {
    write_fake_binary(
        dir,
        "docker",
        &format!("Docker version {version}, build {commit}"),
        "",
        0,
    )
}

fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', r"'\''")
}
