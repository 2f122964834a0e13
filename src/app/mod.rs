//! Setup entry points.
//!
//! # Data Flow
//! ```text
//! ConfigLoader::load → LoggerConfig
//!     → logging_system::build_logger → Arc<Logger>
//! ```

pub mod config;
pub mod logging_system;

pub use config::{ConfigError, ConfigLoader, ConsoleFormat, ElasticsearchConfig, LoggerConfig};
pub use logging_system::build_logger;

use crate::domain::SetupError;
use crate::logger::{Logger, Output};
use std::path::Path;
use std::sync::Arc;

/// Loads configuration from the working directory and environment and
/// builds a logger writing to stdout.
pub fn setup(config_path: Option<&Path>) -> Result<Arc<Logger>, SetupError> {
    setup_with(&ConfigLoader::new(), config_path, Output::stdout())
}

/// Like [`setup`] with an injected loader and console writer. Diagnostics
/// go to the loader's diagnostics writer.
pub fn setup_with(
    loader: &ConfigLoader,
    config_path: Option<&Path>,
    output: Output,
) -> Result<Arc<Logger>, SetupError> {
    let config = loader.load(config_path)?;
    let logger = build_logger(&config, output, loader.diagnostics().clone());
    Ok(Arc::new(logger))
}

/// [`setup`], terminating the process with status 1 if the config cannot
/// be decoded.
pub fn must_setup(config_path: Option<&Path>) -> Arc<Logger> {
    match setup(config_path) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("logger setup failed: {e}");
            std::process::exit(1);
        }
    }
}
