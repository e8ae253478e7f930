//! Docker version identifiers.
//!
//! Parses version strings as printed by `docker --version` and used in git
//! tags, orders them with Docker's release-tag semantics, and derives the
//! download location of the matching release.
//!
//! # Grammar
//!
//! `[v]MAJOR.MINOR.PATCH[-TAG][@COMMIT]`, where `TAG` is one or more
//! hyphen-joined lowercase segments starting with a letter and `COMMIT` is a
//! hex hash optionally suffixed with `-dirty`.

mod binary;
mod download;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{BuildError, BuildErrorKind, BuildResult};
use crate::observability::VERSION_TARGET;

pub use binary::binary_version;
pub use download::{Platform, format_version_number};

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?([0-9]+)\.([0-9]+)\.([0-9]+)(?:-([a-z][a-z0-9]+(?:-[a-z0-9_]+)*))?(?:@([a-f0-9]+(?:-dirty)?))?$",
    )
    .unwrap_or_else(|err| panic!("version pattern must compile: {err}"))
});

/// First release distributed as a multi-binary tarball.
static MULTI_BINARY_RELEASE: LazyLock<Version> =
    LazyLock::new(|| Version::new(1, 11, 0).with_tag("rc1"));

/// A specific release or build of Docker.
///
/// Versions are immutable once constructed. Equality and ordering consider
/// the number, tag, and commit; the display name does not take part.
///
/// # Examples
///
/// ```
/// use docker_devtools::Version;
///
/// let version: Version = "v17.03.0-ce-rc1@60ccb22".parse()?;
/// assert_eq!(version.number(), (17, 3, 0));
/// assert_eq!(version.tag(), Some("ce-rc1"));
/// assert_eq!(version.commit(), Some("60ccb22"));
/// assert_eq!(version.name(), "v17.03.0-ce-rc1");
/// # Ok::<(), docker_devtools::BuildError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    name: String,
    number: [u32; 3],
    tag: Option<String>,
    commit: Option<String>,
}

impl Version {
    /// Returns a final-release version for the given number.
    ///
    /// Useful for comparing against a specific release.
    #[must_use]
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            name: format!("v{}", format_version_number(major, minor, patch)),
            number: [major, minor, patch],
            tag: None,
            commit: None,
        }
    }

    /// Parses a version string as used by `docker --version` and git tags.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildErrorKind::Parse`] error when the string does not
    /// match the version grammar.
    pub fn parse(input: &str) -> BuildResult<Self> {
        let trimmed = input.trim();
        let captures = VERSION_PATTERN.captures(trimmed).ok_or_else(|| {
            BuildError::msg(BuildErrorKind::Parse, format!("no version match in {input:?}"))
        })?;

        let component = |index: usize| -> BuildResult<u32> {
            let raw = captures.get(index).map_or("", |m| m.as_str());
            raw.parse().map_err(|err| {
                BuildError::msg(
                    BuildErrorKind::Parse,
                    format!("invalid version component {raw:?} in {input:?}: {err}"),
                )
            })
        };
        let number = [component(1)?, component(2)?, component(3)?];
        let tag = captures.get(4).map(|m| m.as_str().to_owned());
        let commit = captures.get(5).map(|m| m.as_str().to_owned());

        let name = trimmed
            .split_once('@')
            .map_or(trimmed, |(name, _)| name)
            .to_owned();

        debug!(
            target: VERSION_TARGET,
            input = %input,
            name = %name,
            "parsed version"
        );
        Ok(Self {
            name,
            number,
            tag,
            commit,
        })
    }

    /// Returns a copy of this version carrying the provided tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.name = format!("v{}-{tag}", self.version_string());
        self.tag = Some(tag);
        self
    }

    /// Returns a copy of this version identifying the provided build commit.
    #[must_use]
    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    /// Display name without the commit, e.g. `v1.10.3-rc2`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `(major, minor, patch)` triple.
    #[must_use]
    pub const fn number(&self) -> (u32, u32, u32) {
        let [major, minor, patch] = self.number;
        (major, minor, patch)
    }

    /// Pre-release or channel qualifier, absent for final releases.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Exact build commit, when the version identifies one.
    #[must_use]
    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }

    /// Formats the version number using the release-era convention.
    #[must_use]
    pub fn version_string(&self) -> String {
        let (major, minor, patch) = self.number();
        format_version_number(major, minor, patch)
    }

    /// Returns the cache file name identifying this version.
    ///
    /// Commit builds are keyed by commit alone; releases by
    /// `{major}.{minor}.{patch}[-{tag}]`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        if let Some(commit) = self.commit() {
            return commit.to_owned();
        }
        let (major, minor, patch) = self.number();
        match self.tag() {
            Some(tag) => format!("{major}.{minor}.{patch}-{tag}"),
            None => format!("{major}.{minor}.{patch}"),
        }
    }

    /// Whether this release predates the multi-binary tarball layout.
    #[must_use]
    pub fn is_legacy_release(&self) -> bool {
        *self < *MULTI_BINARY_RELEASE
    }
}

/// Ranks tags so a final release is newest and `dev` is oldest.
fn tag_class(tag: Option<&str>) -> u8 {
    match tag {
        None => 3,
        Some(tag) if tag.starts_with("rc") => 2,
        Some("dev") => 0,
        Some(_) => 1,
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| {
                let (ours, theirs) = (self.tag(), other.tag());
                tag_class(ours)
                    .cmp(&tag_class(theirs))
                    .then_with(|| ours.cmp(&theirs))
            })
            // Deterministic order only; recency needs the commit history.
            .then_with(|| self.commit.cmp(&other.commit))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(commit) = self.commit() {
            write!(f, "@{commit}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
