//! Routes `tracing` events into a [`Logger`].

use super::Logger;
use crate::domain::{Fields, Level, LogRecord};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};

/// Crates whose events would loop back through the delivery hook: the
/// HTTP client and everything it runs on.
const IGNORED_CRATES: &[&str] = &[
    "hyper",
    "hyper_util",
    "hyper_rustls",
    "reqwest",
    "rustls",
    "tokio_rustls",
    "h2",
    "tower",
    "want",
    "mio",
    "tokio",
];

/// Target used by `tracing-log` for records coming from the `log` crate.
const LOG_BRIDGE_TARGET: &str = "log";
const LOG_FIELD_PREFIX: &str = "log.";

#[derive(Debug, Clone)]
pub struct HydraLayer {
    logger: Arc<Logger>,
    extra_ignored: Vec<String>,
}

impl HydraLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            extra_ignored: Vec::new(),
        }
    }

    /// Drops events from one more crate, matched on the first path segment
    /// of the target.
    pub fn with_ignored_target(mut self, crate_name: impl Into<String>) -> Self {
        self.extra_ignored.push(crate_name.into());
        self
    }

    /// Filter matching the wrapped logger's level, for `Layer::with_filter`.
    pub fn level_filter(&self) -> LevelFilter {
        self.logger.level().as_filter()
    }

    fn is_ignored(&self, target: &str) -> bool {
        let root = crate_root(target);
        IGNORED_CRATES.contains(&root) || self.extra_ignored.iter().any(|name| name == root)
    }
}

fn crate_root(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

impl<S: Subscriber> Layer<S> for HydraLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(*metadata.level());
        if !self.logger.is_enabled(level) {
            return;
        }
        if metadata.target() != LOG_BRIDGE_TARGET && self.is_ignored(metadata.target()) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let target = visitor
            .log_target
            .take()
            .filter(|_| metadata.target() == LOG_BRIDGE_TARGET)
            .unwrap_or_else(|| metadata.target().to_string());
        if self.is_ignored(&target) {
            return;
        }
        visitor.fields.insert("target".to_string(), Value::from(target));

        self.logger.emit(LogRecord::new(
            level,
            visitor.message.unwrap_or_default(),
            visitor.fields,
        ));
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    log_target: Option<String>,
    fields: Fields,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else if let Some(log_field) = name.strip_prefix(LOG_FIELD_PREFIX) {
            if log_field == "target" {
                self.log_target = value.as_str().map(str::to_string);
            }
        } else {
            self.fields.insert(name.to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{RecordSink, SharedBuffer};
    use parking_lot::Mutex;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<LogRecord>>);

    impl RecordSink for RecordingSink {
        fn accept(&self, record: &LogRecord) {
            self.0.lock().push(record.clone());
        }
    }

    #[test]
    fn test_tracing_events_become_log_records() {
        let sink = Arc::new(RecordingSink::default());
        let logger = Arc::new(
            Logger::builder()
                .level(Level::Info)
                .output(SharedBuffer::new().output())
                .sink(sink.clone())
                .build(),
        );
        let subscriber = tracing_subscriber::registry().with(HydraLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(service = "hydra", attempt = 3, ok = true, "service started");
            tracing::debug!("below the configured level");
        });

        let records = sink.0.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), "service started");
        assert_eq!(records[0].level(), Level::Info);
        assert_eq!(records[0].fields()["service"], json!("hydra"));
        assert_eq!(records[0].fields()["attempt"], json!(3));
        assert_eq!(records[0].fields()["ok"], json!(true));
        assert!(records[0].fields().contains_key("target"));
    }

    fn layer_with(sink: Arc<RecordingSink>) -> HydraLayer {
        HydraLayer::new(Arc::new(
            Logger::builder()
                .level(Level::Trace)
                .output(SharedBuffer::new().output())
                .sink(sink)
                .build(),
        ))
    }

    #[test]
    fn test_http_stack_targets_are_ignored() {
        let layer = layer_with(Arc::new(RecordingSink::default()));
        assert!(layer.is_ignored("hyper"));
        assert!(layer.is_ignored("hyper::client::pool"));
        assert!(layer.is_ignored("hyper_util::client::legacy::connect::http"));
        assert!(layer.is_ignored("reqwest::connect"));
        assert!(layer.is_ignored("tokio::runtime"));
        assert!(!layer.is_ignored("hyperion"));
        assert!(!layer.is_ignored("hydra::app"));

        let layer = layer.with_ignored_target("httpmock");
        assert!(layer.is_ignored("httpmock::server"));
    }

    #[test]
    fn test_events_from_http_crates_never_reach_sinks() {
        let sink = Arc::new(RecordingSink::default());
        let subscriber = tracing_subscriber::registry().with(layer_with(sink.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "hyper_util::client::legacy::pool", "reuse idle connection");
            tracing::event!(target: "log", tracing::Level::DEBUG, log.target = "reqwest::connect", "starting new connection");
            tracing::event!(target: "log", tracing::Level::INFO, log.target = "billing::jobs", log.line = 12, "job done");
        });

        let records = sink.0.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), "job done");
        assert_eq!(records[0].fields()["target"], json!("billing::jobs"));
        assert!(!records[0].fields().keys().any(|k| k.starts_with("log.")));
    }
}
