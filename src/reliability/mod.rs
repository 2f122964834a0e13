pub mod retry;

pub use retry::{DEFAULT_BACKOFF, DEFAULT_DEADLINE, RetryConfig, RetryManager, RetryOutcome};
