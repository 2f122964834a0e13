use thiserror::Error;

/// The only fatal condition during logger setup: the merged configuration
/// tree cannot be mapped onto typed fields.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("failed to decode logger config: {0}")]
    Decode(#[from] serde_yaml::Error),
}
