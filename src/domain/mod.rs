//! Domain layer for hydra.
//!
//! Contains the canonical types shared across all modules:
//! - `LogRecord`: one structured emission, consumed by every sink
//! - `Level`: severity (Trace/Debug/Info/Warn/Error/Fatal/Panic)
//! - `SetupError`: the single fatal setup error

pub mod error;
pub mod log_level;
pub mod log_record;

pub use error::SetupError;
pub use log_level::{Level, ParseLevelError};
pub use log_record::{Fields, LogRecord};
