//! Behavioural coverage for observability instrumentation.

use std::fs;

use color_eyre::eyre::{Result, ensure};
use docker_devtools::test_support::{StaticFetcher, capture_debug_logs, capture_warn_logs};
use docker_devtools::{BuildCache, FsBuildCache, Platform, Version, copy_file};
use rstest::{fixture, rstest};

#[path = "support/sandbox.rs"]
mod support;

use support::TestSandbox;

const LEGACY_URL: &str = "https://get.docker.com/builds/Linux/x86_64/docker-1.9.1";

#[fixture]
fn sandbox() -> TestSandbox {
    TestSandbox::new("observability").expect("sandbox")
}

fn cache_with(sandbox: &TestSandbox, fetcher: StaticFetcher) -> FsBuildCache<StaticFetcher> {
    FsBuildCache::with_fetcher(sandbox.cache_dir(), fetcher)
        .with_platform(Platform::new("linux", "x86_64"))
}

#[rstest]
fn download_logs_lookup_and_url(sandbox: TestSandbox) -> Result<()> {
    let cache = cache_with(
        &sandbox,
        StaticFetcher::default().with_body(LEGACY_URL, b"docker"),
    );
    let version = Version::parse("1.9.1")?;

    let (logs, result) = capture_debug_logs(|| cache.install(&version, sandbox.target_dir()));
    result?;

    let joined = logs.join("\n");
    ensure!(joined.contains("docker_devtools::cache"), "logs: {joined}");
    ensure!(joined.contains("cache miss"), "logs: {joined}");
    ensure!(joined.contains(LEGACY_URL), "logs: {joined}");
    ensure!(joined.contains("saved download"), "logs: {joined}");
    Ok(())
}

#[rstest]
fn cached_install_logs_hit(sandbox: TestSandbox) -> Result<()> {
    fs::create_dir_all(sandbox.cache_dir())?;
    fs::write(sandbox.cache_dir().join("1.9.1"), "docker")?;
    let cache = cache_with(&sandbox, StaticFetcher::default());
    let version = Version::parse("1.9.1")?;

    let (logs, result) = capture_debug_logs(|| cache.install(&version, sandbox.target_dir()));
    result?;

    ensure!(logs.iter().any(|line| line.contains("cache hit")), "logs: {logs:?}");
    ensure!(
        !logs.iter().any(|line| line.contains("downloading")),
        "cached installs must not download: {logs:?}"
    );
    ensure!(sandbox.read_installed("docker")? == "docker");
    Ok(())
}

#[rstest]
fn copies_log_under_copy_target(sandbox: TestSandbox) -> Result<()> {
    let source = sandbox.work_dir().join("docker");
    fs::write(&source, "binary")?;
    let dest = sandbox.target_dir().join("docker");

    let (logs, result) = capture_debug_logs(|| copy_file(&source, &dest, 0o755));
    result?;

    ensure!(
        logs.iter().any(|line| line.contains("docker_devtools::copy")),
        "logs: {logs:?}"
    );
    Ok(())
}

#[rstest]
fn successful_install_emits_no_warnings(sandbox: TestSandbox) -> Result<()> {
    let cache = cache_with(
        &sandbox,
        StaticFetcher::default().with_body(LEGACY_URL, b"docker"),
    );
    let version = Version::parse("1.9.1")?;

    let (logs, result) = capture_warn_logs(|| cache.install(&version, sandbox.target_dir()));
    result?;

    ensure!(logs.is_empty(), "unexpected warnings: {logs:?}");
    Ok(())
}
