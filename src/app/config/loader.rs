//! Configuration loading: file discovery, environment overlay, typed decode.

use super::serde_helpers::{apply_env_overrides, coerce_to_schema, merge, scalar_to_string};
use super::{ConfigError, ConsoleFormat, LoggerConfig};
use crate::domain::{Level, SetupError};
use crate::logger::Output;
use serde_yaml::Value;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "LOGGER";

/// Variables bound to a key explicitly, in addition to the `LOGGER_` names.
pub const ENV_BINDINGS: &[(&str, &str)] = &[
    ("elasticsearch.insecure_skip_verify", "ELASTIC_INSECURE_SKIP_VERIFY"),
    ("elasticsearch.retries", "ELASTIC_RETRIES"),
];

/// Directories inspected by the fallback search, start directory included.
pub const MAX_SEARCH_DEPTH: usize = 6;

const PRIMARY_FILES: &[&str] = &["logger.yaml", "logger.yml", "logger.json"];
const FALLBACK_FILES: &[&str] = &["logger.example.yaml", "logger.yaml", "logger.yml"];

pub trait FileLookup: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileLookup;

impl FileLookup for OsFileLookup {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

pub trait EnvLookup: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolves a [`LoggerConfig`] from defaults, an optional file and the
/// environment.
pub struct ConfigLoader {
    start_dir: PathBuf,
    files: Box<dyn FileLookup>,
    env: Box<dyn EnvLookup>,
    diagnostics: Output,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Searches from the working directory, reads the real filesystem and
    /// process environment, and reports warnings on stderr.
    pub fn new() -> Self {
        Self {
            start_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            files: Box::new(OsFileLookup),
            env: Box::new(ProcessEnv),
            diagnostics: Output::stderr(),
        }
    }

    pub fn with_start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = dir.into();
        self
    }

    pub fn with_files(mut self, files: impl FileLookup + 'static) -> Self {
        self.files = Box::new(files);
        self
    }

    pub fn with_env(mut self, env: impl EnvLookup + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Output) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn diagnostics(&self) -> &Output {
        &self.diagnostics
    }

    /// Ordered fallback candidates: each directory from the start upwards,
    /// at most [`MAX_SEARCH_DEPTH`] of them. The filesystem root itself is
    /// never searched.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(MAX_SEARCH_DEPTH * FALLBACK_FILES.len());
        let mut dir = self.start_dir.as_path();
        for _ in 0..MAX_SEARCH_DEPTH {
            let Some(parent) = dir.parent() else { break };
            candidates.extend(FALLBACK_FILES.iter().map(|name| dir.join(name)));
            if parent.as_os_str().is_empty() {
                break;
            }
            dir = parent;
        }
        candidates
    }

    /// Loads the configuration. With `explicit` set only that file is read;
    /// otherwise the primary names in the start directory are tried, then
    /// the fallback search. Missing or unreadable files are warnings.
    pub fn load(&self, explicit: Option<&Path>) -> Result<LoggerConfig, SetupError> {
        let defaults = serde_yaml::to_value(LoggerConfig::default())?;
        let mut tree = defaults.clone();

        match self.locate(explicit) {
            Ok((_, file_tree)) => merge(&mut tree, file_tree),
            Err(e) => self.warn(&format!("no configuration file found: {e}")),
        }
        coerce_to_schema(&mut tree, &defaults);

        apply_env_overrides(&mut tree, &defaults, self.env.as_ref(), ENV_PREFIX, ENV_BINDINGS);
        self.warn_on_lenient_fallbacks(&tree);

        Ok(serde_yaml::from_value(tree)?)
    }

    /// Path and contents of the file that wins, if any.
    pub fn locate(&self, explicit: Option<&Path>) -> Result<(PathBuf, Value), ConfigError> {
        if let Some(path) = explicit {
            return self.read_file(path).map(|tree| (path.to_path_buf(), tree));
        }

        let primary = PRIMARY_FILES.iter().map(|name| self.start_dir.join(name));
        let mut last_error = None;
        for path in primary.chain(self.candidate_paths()) {
            if !self.files.is_file(&path) {
                continue;
            }
            match self.read_file(&path) {
                Ok(tree) => return Ok((path, tree)),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ConfigError::NotFound(self.start_dir.clone())))
    }

    fn read_file(&self, path: &Path) -> Result<Value, ConfigError> {
        let content = self
            .files
            .read_to_string(path)
            .map_err(|source| ConfigError::FileError {
                path: path.to_path_buf(),
                source,
            })?;

        let parse_error = |message: String| ConfigError::ParseError {
            path: path.to_path_buf(),
            message,
        };
        let tree: Value = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?
        };

        match tree {
            Value::Mapping(_) | Value::Null => Ok(tree),
            _ => Err(parse_error("top level must be a mapping".to_string())),
        }
    }

    fn warn_on_lenient_fallbacks(&self, tree: &Value) {
        if let Some(level) = scalar_to_string(&tree["level"])
            && level.parse::<Level>().is_err()
        {
            self.warn(&format!("invalid level {level:?}, using {}", Level::Info));
        }
        if let Some(format) = scalar_to_string(&tree["console_format"])
            && ConsoleFormat::parse_lenient(&format) == ConsoleFormat::Text
            && !format.trim().eq_ignore_ascii_case("text")
        {
            self.warn(&format!("unknown console_format {format:?}, using text"));
        }
    }

    fn warn(&self, message: &str) {
        self.diagnostics.write_line(&format!("logger: {message}"));
    }
}
