//! In-memory [`Fetcher`] serving canned release bodies.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use crate::cache::Fetcher;
use crate::error::{BuildError, BuildErrorKind, BuildResult};

/// Serves bodies registered per URL and records every request.
///
/// Unknown URLs fail like an HTTP 404.
///
/// # Examples
/// ```
/// use std::io::Read;
///
/// use docker_devtools::Fetcher;
/// use docker_devtools::test_support::StaticFetcher;
///
/// let fetcher = StaticFetcher::default().with_body("https://example.test/a", b"payload");
/// let mut body = String::new();
/// fetcher.fetch("https://example.test/a")?.read_to_string(&mut body)?;
/// assert_eq!(body, "payload");
/// assert_eq!(fetcher.requests(), ["https://example.test/a"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Body>,
    requests: RefCell<Vec<String>>,
}

#[derive(Debug, Clone)]
enum Body {
    Complete(Vec<u8>),
    Interrupted(Vec<u8>),
}

impl StaticFetcher {
    /// Registers the full body served for `url`.
    #[must_use]
    pub fn with_body(mut self, url: impl Into<String>, body: &[u8]) -> Self {
        self.bodies.insert(url.into(), Body::Complete(body.to_vec()));
        self
    }

    /// Registers a body for `url` whose stream fails after `prefix`.
    #[must_use]
    pub fn with_interrupted_body(mut self, url: impl Into<String>, prefix: &[u8]) -> Self {
        self.bodies
            .insert(url.into(), Body::Interrupted(prefix.to_vec()));
        self
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> BuildResult<Box<dyn Read>> {
        self.requests.borrow_mut().push(url.to_owned());
        match self.bodies.get(url).cloned() {
            Some(Body::Complete(bytes)) => Ok(Box::new(Cursor::new(bytes))),
            Some(Body::Interrupted(bytes)) => Ok(Box::new(InterruptedBody {
                data: Cursor::new(bytes),
            })),
            None => Err(BuildError::msg(
                BuildErrorKind::Transport,
                format!("HTTP 404 Not Found for {url}"),
            )),
        }
    }
}

struct InterruptedBody {
    data: Cursor<Vec<u8>>,
}

impl Read for InterruptedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
            read => Ok(read),
        }
    }
}
