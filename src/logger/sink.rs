use crate::domain::LogRecord;
use std::sync::Arc;

/// A synchronous consumer of admitted log records.
///
/// `accept` cannot fail. A sink turns its own errors into diagnostics and
/// always returns to the caller.
pub trait RecordSink: Send + Sync {
    fn accept(&self, record: &LogRecord);

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Arc<S> {
    fn accept(&self, record: &LogRecord) {
        (**self).accept(record);
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
