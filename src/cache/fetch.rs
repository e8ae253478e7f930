//! Network access for release downloads.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{BuildError, BuildErrorKind, BuildResult, ResultKindExt};
use crate::observability::CACHE_TARGET;

/// Opens download streams for release URLs.
///
/// The build cache only depends on this seam, so tests and alternative
/// transports can supply release bodies without a network.
pub trait Fetcher {
    /// Starts a GET for `url` and returns its body.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildErrorKind::Transport`] error when the request fails or
    /// the server does not answer with a success status.
    fn fetch(&self, url: &str) -> BuildResult<Box<dyn Read>>;
}

/// [`Fetcher`] backed by a blocking `reqwest` client.
///
/// Requests have no timeout unless one is configured.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpFetcher {
    /// Creates a fetcher without a request timeout.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildErrorKind::Transport`] error if the HTTP client cannot
    /// be initialised.
    pub fn new() -> BuildResult<Self> {
        Self::with_timeout(None)
    }

    /// Creates a fetcher whose requests fail after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildErrorKind::Transport`] error if the HTTP client cannot
    /// be initialised.
    pub fn with_timeout(timeout: Option<Duration>) -> BuildResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docker-devtools/", env!("CARGO_PKG_VERSION")))
            .build()
            .kind_context(BuildErrorKind::Transport, || "failed to create HTTP client")?;
        Ok(Self { client, timeout })
    }

    /// Configured request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> BuildResult<Box<dyn Read>> {
        let response = self
            .client
            .get(url)
            .send()
            .kind_context(BuildErrorKind::Transport, || format!("failed to fetch {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuildError::msg(
                BuildErrorKind::Transport,
                format!("HTTP {status} for {url}"),
            ));
        }
        debug!(
            target: CACHE_TARGET,
            url = %url,
            status = %status,
            content_length = ?response.content_length(),
            "download started"
        );
        Ok(Box::new(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_fetcher_defaults_to_no_timeout() {
        let fetcher = HttpFetcher::new().expect("client");
        assert_eq!(fetcher.timeout(), None);
    }

    #[test]
    fn http_fetcher_records_timeout() {
        let fetcher =
            HttpFetcher::with_timeout(Some(Duration::from_secs(60))).expect("client");
        assert_eq!(fetcher.timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn http_fetcher_reports_unreachable_host_as_transport_error() {
        let fetcher =
            HttpFetcher::with_timeout(Some(Duration::from_secs(5))).expect("client");
        let err = fetcher
            .fetch("http://127.0.0.1:9/docker-1.9.0")
            .err()
            .expect("closed port should fail");
        assert_eq!(err.kind(), BuildErrorKind::Transport);
    }
}
