//! Domain error types for the Docker build cache and installers.

use std::fmt::Display;

use color_eyre::Report;
use thiserror::Error;

/// Result alias for operations that may return a [`DevtoolsError`].
pub type Result<T> = std::result::Result<T, DevtoolsError>;

/// Result alias for version, cache, and copy operations.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Result alias for configuration fallible operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level error exposed by the crate.
#[derive(Debug, Error)]
pub enum DevtoolsError {
    /// Indicates a version, cache, or copy operation failed.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// Indicates configuration was missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Categorises build failures so callers can branch on structured errors.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum BuildErrorKind {
    /// Represents errors without a more specific semantic meaning.
    #[default]
    Other,
    /// The version string does not match the version grammar.
    Parse,
    /// The build is only identified by commit and is not cached.
    CannotDownloadByCommit,
    /// The network fetch failed or returned an unsuccessful status.
    Transport,
    /// A file or directory could not be read, created, or renamed.
    Filesystem,
    /// The release tarball could not be extracted.
    Archive,
    /// A bundled binary does not match its checksum sidecar.
    HashMismatch,
    /// Binary output or version tag does not match any known scheme.
    UnsupportedVersionFormat,
}

/// Captures build-specific failures.
#[derive(Debug, Error)]
#[error("{report}")]
pub struct BuildError {
    kind: BuildErrorKind,
    #[source]
    report: Report,
}

impl BuildError {
    /// Constructs a new build error with the provided kind and diagnostic
    /// report.
    #[must_use]
    pub const fn new(kind: BuildErrorKind, report: Report) -> Self {
        Self { kind, report }
    }

    /// Returns the semantic category for this failure.
    #[must_use]
    pub const fn kind(&self) -> BuildErrorKind {
        self.kind
    }

    /// Extracts the underlying diagnostic report.
    pub fn into_report(self) -> Report {
        self.report
    }

    pub(crate) fn msg<M>(kind: BuildErrorKind, message: M) -> Self
    where
        M: Display + std::fmt::Debug + Send + Sync + 'static,
    {
        Self::new(kind, Report::msg(message))
    }
}

impl From<Report> for BuildError {
    fn from(report: Report) -> Self {
        Self::new(BuildErrorKind::Other, report)
    }
}

impl From<ConfigError> for BuildError {
    fn from(err: ConfigError) -> Self {
        let ConfigError(report) = err;
        Self::new(BuildErrorKind::Other, report)
    }
}

/// Captures configuration failures.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ConfigError(#[from] Report);

/// Attaches a [`BuildErrorKind`] and a context message to foreign errors.
pub(crate) trait ResultKindExt<T> {
    fn kind_context<C, F>(self, kind: BuildErrorKind, context: F) -> BuildResult<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultKindExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn kind_context<C, F>(self, kind: BuildErrorKind, context: F) -> BuildResult<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| BuildError::new(kind, Report::new(err).wrap_err(context())))
    }
}
