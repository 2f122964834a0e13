use super::ElasticsearchConfig;
use url::Url;

pub const DEFAULT_INDEX: &str = "logs";

impl ElasticsearchConfig {
    /// Retry count with the floor of one attempt applied.
    pub fn effective_retries(&self) -> u32 {
        self.retries.max(1) as u32
    }

    /// Index name with the empty-name fallback applied.
    pub fn effective_index(&self) -> &str {
        if self.index.trim().is_empty() {
            DEFAULT_INDEX
        } else {
            &self.index
        }
    }

    pub fn validate_url(&self) -> Result<Url, String> {
        parse_endpoint(&self.url)
    }
}

/// Parses a sink address, accepting only http and https.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, String> {
    let url =
        Url::parse(endpoint).map_err(|e| format!("Invalid endpoint URL '{endpoint}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!(
            "Invalid endpoint URL '{endpoint}': unsupported scheme '{other}'"
        )),
    }
}
