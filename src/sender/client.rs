use super::blocking::run_blocking;
use crate::app::config::ElasticsearchConfig;
use crate::app::config::validation::parse_endpoint;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// One failed attempt at the transport level. Only these are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timeout: {0}")]
    Timeout(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_builder() {
            TransportError::InvalidRequest(error.to_string())
        } else {
            TransportError::Network(error.to_string())
        }
    }
}

/// Name of the thread that drives the blocking client's internal runtime.
pub const CLIENT_RUNTIME_THREAD: &str = "reqwest-internal-sync-runtime";

/// True on the blocking client's own runtime thread. A request issued from
/// there waits on the thread that has to serve it.
pub fn on_client_runtime_thread() -> bool {
    std::thread::current().name() == Some(CLIENT_RUNTIME_THREAD)
}

/// What the sink answered. Any status, 2xx or not, is a completed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexResponse {
    pub status: u16,
    pub body: String,
}

impl IndexResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Indexes one JSON document. The seam between the delivery hook and HTTP.
#[cfg_attr(test, automock)]
pub trait IndexTransport: Send + Sync {
    fn index(
        &self,
        index: &str,
        body: &[u8],
        timeout: Duration,
    ) -> Result<IndexResponse, TransportError>;
}

#[derive(Clone)]
pub struct ClientConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub insecure_skip_verify: bool,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            username: String::new(),
            password: String::new(),
            insecure_skip_verify: false,
            user_agent: format!("hydra-logger/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&ElasticsearchConfig> for ClientConfig {
    fn from(config: &ElasticsearchConfig) -> Self {
        Self {
            url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            insecure_skip_verify: config.insecure_skip_verify,
            ..Self::default()
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Blocking Elasticsearch document client, created once and shared.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
    config: ClientConfig,
}

impl ElasticsearchClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = parse_endpoint(&config.url).map_err(ClientError::InvalidConfiguration)?;

        let builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.insecure_skip_verify);
        let client = run_blocking(move || builder.build())?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// `<url>/<index>/_doc?refresh=true`, keeping any path prefix on `url`.
    pub fn document_url(&self, index: &str) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TransportError::InvalidRequest(format!("cannot append path to {}", self.base_url))
            })?
            .pop_if_empty()
            .extend([index, "_doc"]);
        url.query_pairs_mut().append_pair("refresh", "true");
        Ok(url)
    }
}

impl IndexTransport for ElasticsearchClient {
    fn index(
        &self,
        index: &str,
        body: &[u8],
        timeout: Duration,
    ) -> Result<IndexResponse, TransportError> {
        let mut request = self
            .client
            .post(self.document_url(index)?)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .body(body.to_vec());
        if !self.config.username.is_empty() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }

        run_blocking(move || -> Result<IndexResponse, TransportError> {
            let response = request.send()?;
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            Ok(IndexResponse { status, body })
        })
    }
}
