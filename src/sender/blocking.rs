use tokio::runtime::{Handle, RuntimeFlavor};

/// Runs blocking I/O from any context, including from inside a Tokio
/// runtime where the blocking HTTP client would otherwise panic. The caller
/// always waits for `f` to finish.
pub fn run_blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match Handle::try_current() {
        Err(_) => f(),
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => tokio::task::block_in_place(f),
            _ => std::thread::scope(|scope| match scope.spawn(f).join() {
                Ok(value) => value,
                Err(panic) => std::panic::resume_unwind(panic),
            }),
        },
    }
}
