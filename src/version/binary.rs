//! Reads the version of an installed Docker binary.

use std::borrow::Cow;
use std::process::{Command, Output};
use std::sync::LazyLock;

use camino::Utf8Path;
use regex::Regex;
use tracing::debug;

use super::Version;
use crate::error::{BuildError, BuildErrorKind, BuildResult, ResultKindExt};
use crate::observability::VERSION_TARGET;

pub(crate) const OUTPUT_CHAR_LIMIT: usize = 2_048;
pub(crate) const TRUNCATION_SUFFIX: &str = "… [truncated]";

static VERSION_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Docker version ([a-z0-9-.]+), build ([a-f0-9]+(?:-dirty)?)")
        .unwrap_or_else(|err| panic!("version output pattern must compile: {err}"))
});

/// Returns the version reported by `executable --version`.
///
/// The output is expected to read `Docker version VERSION, build COMMIT`;
/// the build becomes the commit of the returned version.
///
/// # Errors
///
/// Returns a [`BuildErrorKind::Filesystem`] error when the executable cannot
/// be started, and [`BuildErrorKind::UnsupportedVersionFormat`] when it exits
/// unsuccessfully or prints something else.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use docker_devtools::binary_version;
///
/// let version = binary_version(Utf8Path::new("/usr/bin/docker"))?;
/// println!("installed: {version}");
/// # Ok::<(), docker_devtools::BuildError>(())
/// ```
pub fn binary_version(executable: &Utf8Path) -> BuildResult<Version> {
    let output = Command::new(executable.as_std_path())
        .arg("--version")
        .output()
        .kind_context(BuildErrorKind::Filesystem, || {
            format!("failed to run {executable} --version")
        })?;

    if !output.status.success() {
        return Err(render_failure(
            &format!("{executable} --version exited with {}", output.status),
            &output,
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = parse_version_output(stdout.trim())?;
    debug!(
        target: VERSION_TARGET,
        executable = %executable,
        version = %version,
        "read binary version"
    );
    Ok(version)
}

/// Parses `Docker version VERSION, build COMMIT`.
pub(crate) fn parse_version_output(text: &str) -> BuildResult<Version> {
    let captures = VERSION_OUTPUT.captures(text).ok_or_else(|| {
        BuildError::msg(
            BuildErrorKind::UnsupportedVersionFormat,
            format!(
                "unexpected response from version: {}",
                truncate_output(Cow::Borrowed(text))
            ),
        )
    })?;
    let raw_version = captures.get(1).map_or("", |m| m.as_str());
    let build = captures.get(2).map_or("", |m| m.as_str());
    Ok(Version::parse(raw_version)?.with_commit(build))
}

fn render_failure(context: &str, output: &Output) -> BuildError {
    let stdout = truncate_output(String::from_utf8_lossy(&output.stdout));
    let stderr = truncate_output(String::from_utf8_lossy(&output.stderr));
    BuildError::msg(
        BuildErrorKind::UnsupportedVersionFormat,
        format!("{context}\nstdout: {stdout}\nstderr: {stderr}"),
    )
}

pub(crate) fn truncate_output(text: Cow<'_, str>) -> String {
    let mut out = String::with_capacity(OUTPUT_CHAR_LIMIT + TRUNCATION_SUFFIX.len());
    let mut chars = text.chars();
    for _ in 0..OUTPUT_CHAR_LIMIT {
        match chars.next() {
            Some(ch) => out.push(ch),
            None => return text.into_owned(),
        }
    }

    if chars.next().is_none() {
        return text.into_owned();
    }

    out.push_str(TRUNCATION_SUFFIX);
    out
}
