use crate::domain::LogRecord;
use serde_json::{Map, Value};

/// Kibana's default time field.
pub const TIMESTAMP_FIELD: &str = "@timestamp";
pub const MESSAGE_FIELD: &str = "message";
pub const LEVEL_FIELD: &str = "level";
pub const LEGACY_TIMESTAMP_FIELD: &str = "timestamp";

/// The indexed document: a copy of the caller's fields with the canonical
/// keys set on top, overwriting any caller field of the same name.
pub fn document_for(record: &LogRecord) -> Map<String, Value> {
    let mut document: Map<String, Value> = record
        .fields()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let timestamp = record.timestamp_rfc3339();
    document.insert(TIMESTAMP_FIELD.to_string(), Value::from(timestamp.clone()));
    document.insert(MESSAGE_FIELD.to_string(), Value::from(record.message()));
    document.insert(LEVEL_FIELD.to_string(), Value::from(record.level().as_str()));
    document.insert(LEGACY_TIMESTAMP_FIELD.to_string(), Value::from(timestamp));
    document
}

pub fn serialize_document(record: &LogRecord) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&document_for(record))
}
