//! Behavioural coverage for installing releases through the build cache.

use std::fs;
use std::io::{Cursor, Read};

use color_eyre::eyre::{Result, ensure, eyre};
use docker_devtools::cli::{InstallOutcome, InstallerArgs, install_version, run_installer};
use docker_devtools::test_support::write_release_tarball;
use docker_devtools::{
    BuildCache, BuildError, BuildErrorKind, BuildResult, DevtoolsEnvCfg, Fetcher,
    FsBuildCache, Platform, Version,
};
use mockall::{mock, predicate};
use rstest::{fixture, rstest};

#[path = "support/sandbox.rs"]
mod support;

use support::TestSandbox;

const LEGACY_URL: &str = "https://get.docker.com/builds/Linux/x86_64/docker-1.9.1";
const CE_URL: &str =
    "https://download.docker.com/linux/static/stable/x86_64/docker-17.06.2-ce.tgz";

mock! {
    Downloads {}
    impl Fetcher for Downloads {
        fn fetch(&self, url: &str) -> BuildResult<Box<dyn Read>>;
    }
}

fn body(bytes: &[u8]) -> BuildResult<Box<dyn Read>> {
    Ok(Box::new(Cursor::new(bytes.to_vec())))
}

#[fixture]
fn sandbox() -> TestSandbox {
    TestSandbox::new("build-cache").expect("sandbox")
}

fn linux_cache(sandbox: &TestSandbox, fetcher: MockDownloads) -> FsBuildCache<MockDownloads> {
    FsBuildCache::with_fetcher(sandbox.cache_dir(), fetcher)
        .with_platform(Platform::new("linux", "x86_64"))
}

#[rstest]
fn downloads_once_then_serves_from_cache(sandbox: TestSandbox) -> Result<()> {
    let mut fetcher = MockDownloads::new();
    fetcher
        .expect_fetch()
        .with(predicate::function(|url: &str| url == LEGACY_URL))
        .times(1)
        .returning(|_| body(b"docker 1.9.1"));
    let cache = linux_cache(&sandbox, fetcher);
    let version = Version::parse("1.9.1")?;

    install_version(&cache, &version, None, sandbox.target_dir())?;
    fs::remove_file(sandbox.target_dir().join("docker"))?;
    install_version(&cache, &version, None, sandbox.target_dir())?;

    ensure!(cache.is_cached(&version));
    ensure!(sandbox.read_installed("docker")? == "docker 1.9.1");
    Ok(())
}

#[rstest]
fn installs_every_binary_of_a_release_tarball(sandbox: TestSandbox) -> Result<()> {
    let tarball = sandbox.work_dir().join("release.tgz");
    write_release_tarball(
        &tarball,
        &[
            ("docker/", b""),
            ("docker/docker", b"client"),
            ("docker/docker-containerd", b"containerd"),
            ("docker/dockerd", b"daemon"),
        ],
    )?;
    let payload = fs::read(&tarball)?;
    let mut fetcher = MockDownloads::new();
    fetcher
        .expect_fetch()
        .with(predicate::function(|url: &str| url == CE_URL))
        .times(1)
        .returning(move |_| body(&payload));
    let cache = linux_cache(&sandbox, fetcher);

    install_version(&cache, &Version::parse("17.06.2-ce")?, None, sandbox.target_dir())?;

    ensure!(sandbox.read_installed("docker")? == "client");
    ensure!(sandbox.read_installed("docker-containerd")? == "containerd");
    ensure!(sandbox.read_installed("dockerd")? == "daemon");
    ensure!(sandbox.cache_dir().join("17.6.2-ce").is_file());
    Ok(())
}

#[rstest]
fn commit_builds_are_never_downloaded(sandbox: TestSandbox) -> Result<()> {
    let mut fetcher = MockDownloads::new();
    fetcher.expect_fetch().never();
    let cache = linux_cache(&sandbox, fetcher);
    let version = Version::parse("1.10.0-dev@0f5ac3b")?;

    let err = cache
        .install(&version, sandbox.target_dir())
        .expect_err("commit build is not cached");

    ensure!(err.kind() == BuildErrorKind::CannotDownloadByCommit);
    Ok(())
}

#[rstest]
fn put_file_is_installed_without_download(sandbox: TestSandbox) -> Result<()> {
    let mut fetcher = MockDownloads::new();
    fetcher.expect_fetch().never();
    let cache = linux_cache(&sandbox, fetcher);
    let source = sandbox.work_dir().join("docker");
    fs::write(&source, "local build")?;
    fs::write(sandbox.work_dir().join("dockerinit"), "local init")?;
    let version = Version::parse("1.10.0-dev@0f5ac3b")?;

    install_version(&cache, &version, Some(&source), sandbox.target_dir())?;

    ensure!(sandbox.read_installed("docker")? == "local build");
    ensure!(sandbox.read_installed("dockerinit")? == "local init");
    ensure!(sandbox.cache_dir().join("0f5ac3b").is_file());
    Ok(())
}

#[rstest]
fn missing_target_directory_is_created(sandbox: TestSandbox) -> Result<()> {
    let mut fetcher = MockDownloads::new();
    fetcher
        .expect_fetch()
        .times(1)
        .returning(|_| body(b"docker 1.9.1"));
    let cache = linux_cache(&sandbox, fetcher);
    let missing = sandbox.target_dir().join("nested").join("bin");

    install_version(&cache, &Version::parse("1.9.1")?, None, &missing)?;

    ensure!(fs::read_to_string(missing.join("docker"))? == "docker 1.9.1");
    Ok(())
}

#[rstest]
fn failed_download_leaves_cache_empty(sandbox: TestSandbox) -> Result<()> {
    let mut fetcher = MockDownloads::new();
    fetcher.expect_fetch().times(1).returning(|url| {
        Err(BuildError::new(
            BuildErrorKind::Transport,
            eyre!("HTTP 503 Service Unavailable for {url}"),
        ))
    });
    let cache = linux_cache(&sandbox, fetcher);
    let version = Version::parse("1.9.1")?;

    let err = cache
        .install(&version, sandbox.target_dir())
        .expect_err("download fails");

    ensure!(err.kind() == BuildErrorKind::Transport);
    ensure!(!cache.is_cached(&version));
    ensure!(!sandbox.target_dir().join("docker").exists());
    Ok(())
}

fn installer_args(sandbox: &TestSandbox, release: &str, check_cache: bool) -> InstallerArgs {
    InstallerArgs {
        target: Some(sandbox.target_dir().to_owned()),
        build_cache: Some(sandbox.cache_dir().to_owned()),
        check_cache,
        put: None,
        verbose: false,
        release: release.to_owned(),
    }
}

#[rstest]
fn check_cache_reports_cached_state(sandbox: TestSandbox) -> Result<()> {
    let cfg = DevtoolsEnvCfg::default();
    let args = installer_args(&sandbox, "1.9.1", true);

    ensure!(run_installer(&args, &cfg)? == InstallOutcome::Uncached);

    fs::create_dir_all(sandbox.cache_dir())?;
    fs::write(sandbox.cache_dir().join("1.9.1"), "cached")?;
    ensure!(run_installer(&args, &cfg)? == InstallOutcome::Cached);
    ensure!(
        !sandbox.target_dir().join("docker").exists(),
        "cache checks must not install"
    );
    Ok(())
}

#[rstest]
fn installer_uses_cached_release(sandbox: TestSandbox) -> Result<()> {
    fs::create_dir_all(sandbox.cache_dir())?;
    fs::write(sandbox.cache_dir().join("1.9.1"), "cached client")?;
    let args = installer_args(&sandbox, "v1.9.1", false);

    let outcome = run_installer(&args, &DevtoolsEnvCfg::default())?;

    ensure!(outcome == InstallOutcome::Installed);
    ensure!(sandbox.read_installed("docker")? == "cached client");
    Ok(())
}
