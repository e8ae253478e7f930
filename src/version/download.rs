//! Download locations for Docker releases.
//!
//! Releases have been published under three URL schemes over time:
//!
//! - `https://get.docker.com/builds/Linux/x86_64/docker-1.9.0` for final
//!   releases before 17.03,
//! - `https://test.docker.com/builds/Linux/x86_64/docker-1.9.0-rc5` for
//!   release candidates before 17.03,
//! - `https://download.docker.com/linux/static/{stable,test}/x86_64/` for the
//!   `ce` channel releases from 17.03 on.

use std::env::consts;

use super::Version;

/// First major version using the year.month numbering.
const YEAR_MONTH_MAJOR: u32 = 17;

/// Formats a version number using the convention of its release era.
///
/// From 17 onwards major and minor are zero-padded to two digits.
///
/// # Examples
///
/// ```
/// use docker_devtools::format_version_number;
///
/// assert_eq!(format_version_number(17, 3, 0), "17.03.0");
/// assert_eq!(format_version_number(1, 9, 1), "1.9.1");
/// ```
#[must_use]
pub fn format_version_number(major: u32, minor: u32, patch: u32) -> String {
    if major < YEAR_MONTH_MAJOR {
        format!("{major}.{minor}.{patch}")
    } else {
        format!("{major:02}.{minor:02}.{patch}")
    }
}

/// Operating system and architecture pair used in download URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// Builds a platform from Docker's OS and architecture names, e.g.
    /// `linux` and `x86_64`.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into().to_ascii_lowercase(),
            arch: arch.into(),
        }
    }

    /// The platform this process runs on, in Docker's naming.
    #[must_use]
    pub fn host() -> Self {
        let os = match consts::OS {
            "macos" => "mac",
            "windows" => "win",
            other => other,
        };
        let arch = match consts::ARCH {
            "arm" => "armhf",
            "powerpc64" => "ppc64le",
            other => other,
        };
        Self::new(os, arch)
    }

    /// Lowercase OS name used by the channel-based download site.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Architecture name.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// OS name as spelled by the legacy builds hosts.
    fn legacy_os(&self) -> String {
        match self.os.as_str() {
            "mac" | "darwin" => "Darwin".to_owned(),
            "win" | "windows" => "Windows".to_owned(),
            other => {
                let mut chars = other.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_ascii_uppercase().to_string() + chars.as_str()
                })
            }
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::host()
    }
}

impl Version {
    /// Returns the download URL for this release on the given platform.
    ///
    /// Returns `None` when the tag does not map to any published scheme,
    /// such as `dev` builds or untagged releases from 17.03 on.
    ///
    /// # Examples
    ///
    /// ```
    /// use docker_devtools::{Platform, Version};
    ///
    /// let platform = Platform::new("linux", "x86_64");
    /// let version = Version::parse("17.03.0-ce")?;
    /// assert_eq!(
    ///     version.download_url(&platform).as_deref(),
    ///     Some("https://download.docker.com/linux/static/stable/x86_64/docker-17.03.0-ce.tgz"),
    /// );
    /// # Ok::<(), docker_devtools::BuildError>(())
    /// ```
    #[must_use]
    pub fn download_url(&self, platform: &Platform) -> Option<String> {
        let suffix = if self.is_legacy_release() { "" } else { ".tgz" };
        let (major, _, _) = self.number();
        let version = self.version_string();
        let arch = platform.arch();

        match self.tag() {
            None if major < YEAR_MONTH_MAJOR => Some(format!(
                "https://get.docker.com/builds/{}/{arch}/docker-{version}{suffix}",
                platform.legacy_os()
            )),
            Some(tag) if tag.starts_with("rc") && major < YEAR_MONTH_MAJOR => Some(format!(
                "https://test.docker.com/builds/{}/{arch}/docker-{version}-{tag}{suffix}",
                platform.legacy_os()
            )),
            Some(tag) if tag.starts_with("ce") => {
                let channel = if tag.starts_with("ce-rc") {
                    "test"
                } else {
                    "stable"
                };
                Some(format!(
                    "https://download.docker.com/{}/static/{channel}/{arch}/docker-{version}-{tag}{suffix}",
                    platform.os()
                ))
            }
            _ => None,
        }
    }
}
