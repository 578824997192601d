//! Fetching raw XML from a local file or the remote API.

use crate::error::{EveApiError, Result};
use crate::params::RequestParams;
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Version marker appended to every remote request
pub const API_VERSION: &str = "2";

/// Body text used when an exhausted fetch has nothing better to report
const NO_RESPONSE_BODY: &str = "No Response Body!";

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// XML file on the local filesystem
    File(PathBuf),
    /// Remote API endpoint
    Url(Url),
}

impl Source {
    /// Interpret a string as a source.
    ///
    /// Strings starting with `http://` or `https://` are URLs, everything else
    /// is a filesystem path.
    pub fn parse(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            Ok(Source::Url(Url::parse(source)?))
        } else {
            Ok(Source::File(PathBuf::from(source)))
        }
    }

    /// The path component used for fingerprinting
    pub fn path_string(&self) -> String {
        match self {
            Source::File(path) => path.to_string_lossy().replace('\\', "/"),
            Source::Url(url) => url.path().to_string(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
        }
    }
}

impl From<Url> for Source {
    fn from(url: Url) -> Self {
        Source::Url(url)
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::File(path)
    }
}

/// Build `key=value&...` in key order, with the version marker added
pub fn format_query(params: &RequestParams) -> String {
    let mut pairs: Vec<(&str, &str)> = params.payload().collect();
    if !params.contains("version") {
        pairs.push(("version", API_VERSION));
        pairs.sort_by(|a, b| a.0.cmp(b.0));
    }
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Retrying fetcher for raw response bodies
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http_client: Client,
    max_tries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    /// Create a fetcher around an already configured HTTP client
    pub fn new(http_client: Client, max_tries: u32, retry_delay: Duration) -> Self {
        Self {
            http_client,
            max_tries: max_tries.max(1),
            retry_delay,
        }
    }

    /// Fetch the raw body for `source` with `params`.
    ///
    /// Files are read as-is. URLs are requested with `GET`, retrying transport
    /// failures up to `max_tries` times with `retry_delay` between attempts.
    pub async fn fetch(&self, source: &Source, params: &RequestParams) -> Result<String> {
        match source {
            Source::File(path) => {
                debug!("Reading XML from file: {}", path.display());
                Ok(tokio::fs::read_to_string(path).await?)
            }
            Source::Url(url) => self.fetch_url(url, params).await,
        }
    }

    async fn fetch_url(&self, url: &Url, params: &RequestParams) -> Result<String> {
        let mut full_url = url.clone();
        full_url.set_query(Some(&format_query(params)));

        let mut last_failure = None;

        for attempt in 1..=self.max_tries {
            debug!(
                "Making request to {} (attempt {}/{})",
                full_url.path(),
                attempt,
                self.max_tries
            );

            match self.http_client.get(full_url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await;

                    if status.is_success() || status.is_redirection() {
                        match body {
                            Ok(body) => return Ok(body),
                            Err(e) => {
                                warn!(
                                    "Failed to read body on attempt {}/{}: {}",
                                    attempt, self.max_tries, e
                                );
                                last_failure = Some(e.to_string());
                            }
                        }
                    } else {
                        warn!("Request to {} failed with status {}", full_url.path(), status);
                        let body = body
                            .ok()
                            .filter(|b| !b.is_empty())
                            .unwrap_or_else(|| NO_RESPONSE_BODY.to_string());
                        return Err(EveApiError::network_status(Some(status.as_u16()), body));
                    }
                }
                Err(e) => {
                    warn!(
                        "Network error on attempt {}/{}: {}",
                        attempt, self.max_tries, e
                    );
                    last_failure = Some(e.to_string());
                }
            }

            if attempt < self.max_tries {
                debug!("Retrying after {:?}", self.retry_delay);
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Err(EveApiError::network_status(
            None,
            last_failure.unwrap_or_else(|| NO_RESPONSE_BODY.to_string()),
        ))
    }
}

mod urlencoding {
    pub fn encode(input: &str) -> String {
        url::form_urlencoded::byte_serialize(input.as_bytes()).collect()
    }
}
