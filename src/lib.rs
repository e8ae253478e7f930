//! Fetches, caches, and installs versioned Docker release binaries for
//! local development.
//!
//! Versions such as `1.9.1`, `17.03.0-ce` or `1.10.0-dev@a1b2c3d` are parsed
//! into an ordered [`Version`]. A [`BuildCache`] maps each version to a file
//! on local storage, downloads missing releases from Docker's historical
//! hosts, and installs them into a target directory using either the legacy
//! single-binary layout or the multi-binary tarball layout introduced with
//! 1.11.0. [`copy_bundle_binaries`] installs binaries straight out of a
//! Docker build bundle, verifying their SHA-256 sidecars.

pub mod cache;
pub mod cli;
mod config;
mod copy;
mod error;
mod observability;
#[doc(hidden)]
pub mod test_support;
mod version;

pub use cache::{BuildCache, Fetcher, FsBuildCache, HttpFetcher};
pub use config::DevtoolsEnvCfg;
pub use copy::{BINARY_MODE, copy_bundle_binaries, copy_file, file_digest};
pub use error::{
    BuildError, BuildErrorKind, BuildResult, ConfigError, ConfigResult, DevtoolsError, Result,
};
pub use version::{Platform, Version, binary_version, format_version_number};
