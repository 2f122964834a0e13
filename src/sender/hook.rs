use super::client::{
    ClientConfig, ClientError, ElasticsearchClient, IndexResponse, IndexTransport, TransportError,
    on_client_runtime_thread,
};
use super::serialization::serialize_document;
use crate::app::config::ElasticsearchConfig;
use crate::domain::LogRecord;
use crate::logger::{Output, RecordSink};
use crate::reliability::{RetryConfig, RetryManager, RetryOutcome};
use std::fmt;

/// Best-effort delivery of every admitted record to an Elasticsearch index.
///
/// Each record gets one attempt sequence: up to `retries` tries within a
/// five second budget, 100 ms apart. Only transport failures are retried;
/// a non-2xx answer is reported and dropped. Nothing here ever reaches the
/// caller except as a line on the diagnostics output.
pub struct DeliveryHook {
    transport: Box<dyn IndexTransport>,
    index: String,
    retry: RetryManager,
    diagnostics: Output,
}

impl DeliveryHook {
    pub fn new(transport: impl IndexTransport + 'static, index: impl Into<String>, retries: u32) -> Self {
        Self {
            transport: Box::new(transport),
            index: index.into(),
            retry: RetryManager::new(RetryConfig::with_attempts(retries)),
            diagnostics: Output::stderr(),
        }
    }

    /// Builds the HTTP client from sink settings. Fails only if the client
    /// cannot be constructed, e.g. for an invalid URL.
    pub fn from_config(config: &ElasticsearchConfig) -> Result<Self, ClientError> {
        let client = ElasticsearchClient::new(ClientConfig::from(config))?;
        Ok(Self::new(
            client,
            config.effective_index(),
            config.effective_retries(),
        ))
    }

    pub fn with_diagnostics(mut self, diagnostics: Output) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry = RetryManager::new(config);
        self
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry.max_attempts()
    }

    fn deliver(&self, record: &LogRecord) {
        let payload = match serialize_document(record) {
            Ok(payload) => payload,
            Err(e) => {
                self.report(format_args!("failed to marshal log entry for ES: {e}"));
                return;
            }
        };

        let max = self.retry.max_attempts();
        let outcome = self.retry.run(
            |_, remaining| self.transport.index(&self.index, &payload, remaining),
            |attempt, e: &TransportError| {
                self.report(format_args!("ES index attempt {attempt}/{max} failed: {e}"));
            },
        );

        match outcome {
            RetryOutcome::Completed {
                value: IndexResponse { status, body },
                attempts,
            } if !(200..300).contains(&status) => {
                self.report(format_args!(
                    "ES responded with status={status} on attempt {attempts}/{max} body={body}"
                ));
            }
            RetryOutcome::Completed { .. } => {}
            RetryOutcome::Failed {
                attempts,
                timed_out,
                ..
            } => {
                let reason = if timed_out { "timeout exceeded" } else { "retries exhausted" };
                self.report(format_args!(
                    "dropping log entry for ES after {attempts} attempt(s): {reason}"
                ));
            }
        }
    }

    fn report(&self, message: fmt::Arguments<'_>) {
        self.diagnostics.write_line(&format!("logger: {message}"));
    }
}

impl RecordSink for DeliveryHook {
    /// Records raised by the HTTP stack on its own runtime thread are
    /// console-only.
    fn accept(&self, record: &LogRecord) {
        if on_client_runtime_thread() {
            return;
        }
        self.deliver(record);
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}

impl fmt::Debug for DeliveryHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryHook")
            .field("index", &self.index)
            .field("retry", self.retry.config())
            .finish_non_exhaustive()
    }
}
