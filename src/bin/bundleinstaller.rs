//! Copies the binaries of Docker build bundles into a target directory:
//! `bundleinstaller <BUNDLE_DIR>... <TARGET_DIR>`.
//!
//! Every binary with a `.sha256` sidecar is installed with mode `0755` and
//! checked against its recorded digest. Bundles are processed in order and
//! the first failure stops the run with a non-zero exit status.

use clap::Parser;
use docker_devtools::cli::{BundleArgs, init_tracing, run_bundle_installer};

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    let args = BundleArgs::parse();
    init_tracing(args.verbose);
    run_bundle_installer(&args)?;
    Ok(())
}
