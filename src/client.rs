//! EVE XML API client and query pipeline.

use crate::error::{EveApiError, Result};
use crate::fetch::{HttpFetcher, Source};
use crate::fingerprint::fingerprint;
use crate::params::{Credentials, RequestParams, JUST_HASH, URL_OVERRIDE};
use crate::persist::{save_filename, save_xml};
use crate::response::Response;
use crate::rows::{map_rows, FromRow, RowSelector};
use crate::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Configuration for the EVE API client
#[derive(Debug, Clone)]
pub struct EveApiClientConfig {
    /// Base URL that endpoint paths are resolved against
    pub base_url: String,
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Connection timeout in seconds
    pub connect_timeout_seconds: u64,
    /// Read timeout in seconds
    pub read_timeout_seconds: u64,
    /// Maximum number of attempts per request
    pub max_tries: u32,
    /// Pause between attempts after a transport failure
    pub retry_delay: Duration,
    /// Directory to save raw responses under; `None` disables saving
    pub save_path: Option<PathBuf>,
    /// Skip TLS certificate verification. Insecure; test servers only.
    pub accept_invalid_certs: bool,
}

impl Default for EveApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_seconds: 3,
            read_timeout_seconds: 20,
            max_tries: 3,
            retry_delay: Duration::from_secs(5),
            save_path: None,
            accept_invalid_certs: false,
        }
    }
}

/// One logical API call, before credentials are merged in
#[derive(Debug, Clone)]
pub struct Query {
    endpoint: String,
    path: String,
    source: Option<Source>,
    params: RequestParams,
    fingerprint_only: bool,
}

impl Query {
    /// A call to `path` (relative to the base URL). `endpoint` names the
    /// directory responses are saved under.
    pub fn new(endpoint: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            path: path.into(),
            source: None,
            params: RequestParams::new(),
            fingerprint_only: false,
        }
    }

    /// Replace the caller parameters
    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Add one caller parameter
    pub fn param(mut self, key: impl AsRef<str>, value: impl ToString) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Read from another source (file or URL) instead of the endpoint path
    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// Only compute the fingerprint; perform no I/O
    pub fn fingerprint_only(mut self) -> Self {
        self.fingerprint_only = true;
        self
    }

    /// Logical endpoint name
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Value of an executed call plus the metadata of its response
#[derive(Debug, Clone)]
pub struct CallResult<T> {
    /// Fingerprint of the call
    pub fingerprint: String,
    /// Server clock at response time
    pub current_time: DateTime<Utc>,
    /// Server-supplied expiry of the response
    pub cached_until: Option<DateTime<Utc>>,
    /// The returned value
    pub value: T,
}

impl<T> CallResult<T> {
    /// Transform the value, keeping the metadata
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<CallResult<U>> {
        Ok(CallResult {
            fingerprint: self.fingerprint,
            current_time: self.current_time,
            cached_until: self.cached_until,
            value: f(self.value)?,
        })
    }
}

/// Outcome of a query: its fingerprint only, or fetched data
#[derive(Debug, Clone)]
pub enum QueryOutput<T> {
    /// The call was fingerprint-only
    Fingerprint(String),
    /// The call was executed
    Data(CallResult<T>),
}

impl<T> QueryOutput<T> {
    /// Transform fetched data; a fingerprint passes through unchanged
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<QueryOutput<U>> {
        match self {
            QueryOutput::Fingerprint(h) => Ok(QueryOutput::Fingerprint(h)),
            QueryOutput::Data(data) => Ok(QueryOutput::Data(data.try_map(f)?)),
        }
    }

    /// The fingerprint, if this was a fingerprint-only call
    pub fn fingerprint(&self) -> Option<&str> {
        match self {
            QueryOutput::Fingerprint(h) => Some(h),
            QueryOutput::Data(_) => None,
        }
    }

    /// The fetched data, if the call was executed
    pub fn into_data(self) -> Option<CallResult<T>> {
        match self {
            QueryOutput::Fingerprint(_) => None,
            QueryOutput::Data(data) => Some(data),
        }
    }

    /// The fetched value, if the call was executed
    pub fn into_value(self) -> Option<T> {
        self.into_data().map(|data| data.value)
    }
}

/// Snapshot of the most recent call made through a client.
///
/// Concurrent calls on the same client overwrite each other; use the
/// returned [`CallResult`] when calls may overlap.
#[derive(Debug, Clone, Default)]
pub struct LastCall {
    /// Fingerprint of the call
    pub fingerprint: Option<String>,
    /// Raw body, once one was fetched
    pub raw_xml: Option<String>,
    /// Server clock of the response, error responses included
    pub current_time: Option<DateTime<Utc>>,
    /// Expiry of the response, error responses included
    pub cached_until: Option<DateTime<Utc>>,
}

/// Main EVE XML API client
pub struct EveApiClient {
    /// Retrying fetcher over the HTTP client
    fetcher: HttpFetcher,
    /// Account credentials
    credentials: Credentials,
    /// Client configuration
    config: EveApiClientConfig,
    /// Introspection state of the last call
    last_call: Arc<RwLock<LastCall>>,
}

impl EveApiClient {
    /// Create a new client with default configuration
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, EveApiClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(credentials: Credentials, config: EveApiClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .read_timeout(Duration::from_secs(config.read_timeout_seconds))
            // every attempt opens a fresh connection
            .pool_max_idle_per_host(0);

        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let fetcher = HttpFetcher::new(builder.build()?, config.max_tries, config.retry_delay);

        Ok(Self {
            fetcher,
            credentials,
            config,
            last_call: Arc::new(RwLock::new(LastCall::default())),
        })
    }

    /// The credentials requests are made with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The client configuration
    pub fn config(&self) -> &EveApiClientConfig {
        &self.config
    }

    /// State recorded by the most recent call
    pub async fn last_call(&self) -> LastCall {
        self.last_call.read().await.clone()
    }

    /// Fingerprint of the most recent call
    pub async fn last_fingerprint(&self) -> Option<String> {
        self.last_call.read().await.fingerprint.clone()
    }

    /// Compute a query's fingerprint without performing it
    pub async fn fingerprint(&self, query: Query) -> Result<String> {
        match self.execute(query.fingerprint_only()).await? {
            QueryOutput::Fingerprint(h) => Ok(h),
            QueryOutput::Data(data) => Ok(data.fingerprint),
        }
    }

    /// Run a query and return the raw, error-checked response.
    ///
    /// Merges credential defaults under the caller's parameters, records the
    /// fingerprint, then (unless fingerprint-only) fetches, raises any API
    /// error, and saves the raw XML when a save path is configured.
    pub async fn execute(&self, query: Query) -> Result<QueryOutput<Response>> {
        let mut params = query
            .params
            .merged_over(&self.credentials.default_params());
        let fingerprint_only = query.fingerprint_only || params.remove(JUST_HASH).is_some();

        let source = match params.remove(URL_OVERRIDE) {
            Some(location) => Source::parse(&location)?,
            None => match query.source {
                Some(source) => source,
                None => Source::Url(self.build_url(&query.path)?),
            },
        };

        let hash = fingerprint(&source, &params)?;
        debug!("Fingerprint for {}: {}", query.endpoint, hash);
        *self.last_call.write().await = LastCall {
            fingerprint: Some(hash.clone()),
            ..Default::default()
        };

        if fingerprint_only {
            return Ok(QueryOutput::Fingerprint(hash));
        }

        let raw = self.fetcher.fetch(&source, &params).await?;
        self.last_call.write().await.raw_xml = Some(raw.clone());

        let response = match Response::parse(raw) {
            Ok(response) => response,
            Err(err) => {
                if let EveApiError::Api(api) = &err {
                    let mut last = self.last_call.write().await;
                    last.current_time = api.current_time;
                    last.cached_until = api.cached_until;
                }
                return Err(err);
            }
        };
        {
            let mut last = self.last_call.write().await;
            last.current_time = Some(response.current_time);
            last.cached_until = response.cached_until;
        }

        if let Some(base) = &self.config.save_path {
            let path = save_filename(
                base,
                &self.credentials.key_id,
                &query.endpoint,
                response.cached_until,
            );
            save_xml(&path, response.raw()).await?;
        }

        info!("Completed {} call", query.endpoint);
        Ok(QueryOutput::Data(CallResult {
            fingerprint: hash,
            current_time: response.current_time,
            cached_until: response.cached_until,
            value: response,
        }))
    }

    /// Run a query and map the selected rows into records
    pub async fn execute_rows<T: FromRow>(
        &self,
        query: Query,
        selector: &RowSelector,
    ) -> Result<QueryOutput<Vec<T>>> {
        let output = self.execute(query).await?;
        output.try_map(|response| {
            let rows = map_rows(response.document(), selector)?;
            debug!("Mapped {} rows", rows.len());
            Ok(rows)
        })
    }

    /// Resolve an endpoint path against the base URL
    pub fn build_url(&self, path: &str) -> Result<Url> {
        let mut base = self.config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?.join(path.trim_start_matches('/'))?)
    }
}
