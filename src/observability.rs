//! Shared tracing targets for observability instrumentation.
//!
//! Centralises the log targets used by the crate so subscribers can filter
//! cache, copy, and version events without pulling in unrelated logs.

/// Target used by version parsing and binary inspection.
pub(crate) const VERSION_TARGET: &str = "docker_devtools::version";

/// Target used by cache lookups, downloads, and installs.
pub(crate) const CACHE_TARGET: &str = "docker_devtools::cache";

/// Target used by file and bundle copy operations.
pub(crate) const COPY_TARGET: &str = "docker_devtools::copy";

/// Target used by the command-line front ends.
pub(crate) const CLI_TARGET: &str = "docker_devtools::cli";
