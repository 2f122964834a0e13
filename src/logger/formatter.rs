//! Console line rendering for the two supported formats.

use crate::app::config::ConsoleFormat;
use crate::domain::LogRecord;
use serde_json::{Map, Value};

const TIME_KEY: &str = "time";
const LEVEL_KEY: &str = "level";
const MESSAGE_KEY: &str = "msg";

impl ConsoleFormat {
    pub fn format(&self, record: &LogRecord) -> String {
        match self {
            ConsoleFormat::Text => format_text(record),
            ConsoleFormat::Json => format_json(record),
        }
    }
}

/// `time="..." level=info msg="..." key=value`, fields sorted by key.
pub fn format_text(record: &LogRecord) -> String {
    let mut line = String::with_capacity(64 + record.message().len());
    append_pair(&mut line, TIME_KEY, &record.timestamp_rfc3339());
    append_pair(&mut line, LEVEL_KEY, record.level().as_str());
    append_pair(&mut line, MESSAGE_KEY, record.message());

    for (key, value) in record.fields() {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        append_pair(&mut line, key, &rendered);
    }

    line
}

/// One JSON object per line. Caller fields named like a reserved key are
/// moved to `fields.<key>` so they cannot shadow the record's own values.
pub fn format_json(record: &LogRecord) -> String {
    let mut object = Map::new();
    for (key, value) in record.fields() {
        let key = match key.as_str() {
            TIME_KEY | LEVEL_KEY | MESSAGE_KEY => format!("fields.{key}"),
            _ => key.clone(),
        };
        object.insert(key, value.clone());
    }
    object.insert(TIME_KEY.to_string(), Value::from(record.timestamp_rfc3339()));
    object.insert(LEVEL_KEY.to_string(), Value::from(record.level().as_str()));
    object.insert(MESSAGE_KEY.to_string(), Value::from(record.message()));

    serde_json::to_string(&object)
        .unwrap_or_else(|e| format!("{{\"msg\":\"failed to serialize log record: {e}\"}}"))
}

fn append_pair(line: &mut String, key: &str, value: &str) {
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(key);
    line.push('=');
    if needs_quoting(value) {
        line.push_str(&format!("{value:?}"));
    } else {
        line.push_str(value);
    }
}

fn needs_quoting(value: &str) -> bool {
    !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
}
