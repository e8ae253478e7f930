//! Installs a Docker release into a local directory, downloading it into the
//! build cache first when it is missing.
//!
//! Configuration is read from command-line flags and `DOCKER_DEVTOOLS_*`
//! environment variables parsed by
//! [`OrthoConfig`](https://github.com/leynos/ortho-config). With
//! `--check-cache` (or the single-dash `-cc`) the binary prints `cached` or `uncached` and exits with
//! status `0` or `1` respectively.

use std::process::ExitCode;

use docker_devtools::DevtoolsEnvCfg;
use docker_devtools::cli::{InstallerArgs, init_tracing, run_installer};

#[expect(
    clippy::print_stdout,
    reason = "cache checks report their result on stdout for scripts"
)]
fn main() -> color_eyre::eyre::Result<ExitCode> {
    color_eyre::install()?;
    let args = InstallerArgs::parse_with_single_dash_flags(std::env::args_os());
    init_tracing(args.verbose);

    let cfg = DevtoolsEnvCfg::load()?;
    let outcome = run_installer(&args, &cfg)?;
    if let Some(report) = outcome.report() {
        println!("{report}");
    }
    Ok(outcome.exit_code())
}
