//! Command-line front ends for installing Docker builds.
//!
//! The binaries stay thin: they parse arguments with the types defined here,
//! install a stderr `tracing` subscriber, and delegate to the run functions
//! so behaviour can be exercised without spawning processes.

mod bundle;
mod installer;

use tracing::Level;
use tracing::debug;

use crate::observability::CLI_TARGET;

pub use bundle::{BundleArgs, absolute_clean, run_bundle_installer};
pub use installer::{
    InstallOutcome, InstallerArgs, expand_single_dash_flags, install_version, run_installer,
};

/// Installs a `tracing` subscriber writing to stderr.
///
/// Logs at `INFO` by default and at `DEBUG` when `verbose` is set. Calling
/// this when a global subscriber already exists leaves that subscriber in
/// place.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(err) = installed {
        debug!(
            target: CLI_TARGET,
            error = %err,
            "keeping existing tracing subscriber"
        );
    }
}
