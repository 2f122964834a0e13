#![deny(rust_2024_compatibility)]
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // retry counts and status codes stay small
    clippy::cast_sign_loss,           // clamped to at least 1 before the cast
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

//! Hydra: a structured logger with best-effort Elasticsearch delivery.
//!
//! ```no_run
//! let logger = hydra::must_setup(None);
//! logger.with_field("service", "billing").info("started");
//! ```

pub mod app;
pub mod domain;
pub mod logger;
pub mod reliability;
pub mod sender;

pub use app::{LoggerConfig, must_setup, setup, setup_with};
pub use domain::{Fields, Level, LogRecord, SetupError};
pub use logger::{Entry, HydraLayer, Logger};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn greeting() -> &'static str {
    "Hello from Hydra!"
}
