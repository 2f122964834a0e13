//! Logger configuration.
//!
//! # Data Flow
//! ```text
//! defaults (LoggerConfig::default)
//!     → config file (logger.yaml / fallback search)
//!     → environment (LOGGER_* plus bound ELASTIC_*)
//!     → typed decode → LoggerConfig (immutable)
//! ```

pub mod loader;
pub mod serde_helpers;
pub mod validation;

use crate::domain::Level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub use loader::{ConfigLoader, EnvLookup, FileLookup, OsFileLookup, ProcessEnv};

/// Non-fatal problems with a config file. The loader reports these as
/// warnings and carries on with defaults.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration file found in {} or its parent directories", .0.display())]
    NotFound(PathBuf),
    #[error("File error: {}: {source}", .path.display())]
    FileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {}: {message}", .path.display())]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    #[default]
    Text,
    Json,
}

impl ConsoleFormat {
    /// `json` selects JSON; anything else is text.
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            ConsoleFormat::Json
        } else {
            ConsoleFormat::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    #[serde(deserialize_with = "serde_helpers::lenient_level")]
    pub level: Level,
    #[serde(deserialize_with = "serde_helpers::lenient_console_format")]
    pub console_format: ConsoleFormat,
    pub elasticsearch: ElasticsearchConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            console_format: ConsoleFormat::Text,
            elasticsearch: ElasticsearchConfig::default(),
        }
    }
}

/// Remote sink settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    pub enabled: bool,
    pub url: String,
    pub index: String,
    pub username: String,
    pub password: String,
    pub insecure_skip_verify: bool,
    /// Total delivery attempts per record, not extra attempts after the first.
    pub retries: i32,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "http://localhost:9200".to_string(),
            index: "logs".to_string(),
            username: String::new(),
            password: String::new(),
            insecure_skip_verify: false,
            retries: 1,
        }
    }
}
