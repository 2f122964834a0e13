use super::log_level::Level;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Caller-supplied contextual fields, kept sorted so output is stable.
pub type Fields = BTreeMap<String, Value>;

/// One structured log emission.
///
/// Records are immutable once built. Sinks receive a shared reference and
/// must copy `fields()` before adding anything of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    fields: Fields,
    message: String,
    level: Level,
    time: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>, fields: Fields) -> Self {
        Self {
            fields,
            message: message.into(),
            level,
            time: Utc::now(),
        }
    }

    /// Replaces the capture time, mostly useful for deterministic output.
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp_rfc3339(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
