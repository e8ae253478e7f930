//! Internal helpers re-exported for unit and integration tests.
//!
//! The fetcher and tarball builders let cache tests run without network
//! access; the logging helpers capture `tracing` output for assertions.

mod archive;
mod fetcher;
mod logging;
#[cfg(unix)]
mod script;

pub use archive::write_release_tarball;
pub use fetcher::StaticFetcher;
pub use logging::{capture_debug_logs, capture_warn_logs};
#[cfg(unix)]
pub use script::{write_fake_binary, write_fake_docker};
