//! Structured logger facade.
//!
//! # Data Flow
//! ```text
//! call site
//!     → Logger / Entry (level gate)
//!     → console formatter (text or json) → Output
//!     → every RecordSink, in attach order (e.g. DeliveryHook)
//! ```
//!
//! Everything runs on the calling thread; there is no queue.

pub mod bridge;
pub mod formatter;
pub mod output;
pub mod sink;

pub use bridge::HydraLayer;
pub use output::{Output, SharedBuffer};
pub use sink::RecordSink;

use crate::app::config::ConsoleFormat;
use crate::domain::{Fields, Level, LogRecord};
use serde_json::Value;
use std::cell::Cell;
use std::fmt;

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Resets the per-thread dispatch flag even if a sink panics.
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Option<Self> {
        let already = DISPATCHING.with(|flag| flag.replace(true));
        if already { None } else { Some(DispatchGuard) }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

pub struct Logger {
    level: Level,
    console_format: ConsoleFormat,
    output: Output,
    sinks: Vec<Box<dyn RecordSink>>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn console_format(&self) -> ConsoleFormat {
        self.console_format
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Entry<'_> {
        Entry::new(self).with_field(key, value)
    }

    pub fn with_fields<I, K, V>(&self, fields: I) -> Entry<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Entry::new(self).with_fields(fields)
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        Entry::new(self).log(level, message);
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    /// Logs at fatal level, then exits the process with status 1.
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        Entry::new(self).fatal(message)
    }

    /// Logs at panic level, then panics with the message.
    pub fn panic(&self, message: impl Into<String>) -> ! {
        Entry::new(self).panic(message)
    }

    /// Writes an already built record: level gate, console line, then sinks.
    ///
    /// A record emitted while this thread is already inside a sink only
    /// reaches the console.
    pub fn emit(&self, record: LogRecord) {
        if !self.is_enabled(record.level()) {
            return;
        }

        self.output.write_line(&self.console_format.format(&record));

        let Some(_guard) = DispatchGuard::enter() else {
            return;
        };
        for sink in &self.sinks {
            sink.accept(&record);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("console_format", &self.console_format)
            .field("sinks", &self.sink_names())
            .finish()
    }
}

pub struct LoggerBuilder {
    level: Level,
    console_format: ConsoleFormat,
    output: Option<Output>,
    sinks: Vec<Box<dyn RecordSink>>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            level: Level::Info,
            console_format: ConsoleFormat::Text,
            output: None,
            sinks: Vec::new(),
        }
    }
}

impl LoggerBuilder {
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn console_format(mut self, format: ConsoleFormat) -> Self {
        self.console_format = format;
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Appends a sink. Sinks are invoked in the order they were added.
    pub fn sink<S: RecordSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            level: self.level,
            console_format: self.console_format,
            output: self.output.unwrap_or_else(Output::stdout),
            sinks: self.sinks,
        }
    }
}

/// A record under construction: accumulated fields bound to a logger.
pub struct Entry<'a> {
    logger: &'a Logger,
    fields: Fields,
}

impl<'a> Entry<'a> {
    fn new(logger: &'a Logger) -> Self {
        Self {
            logger,
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn log(self, level: Level, message: impl Into<String>) {
        if !self.logger.is_enabled(level) {
            return;
        }
        self.logger.emit(LogRecord::new(level, message, self.fields));
    }

    pub fn trace(self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    pub fn debug(self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn error(self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn fatal(self, message: impl Into<String>) -> ! {
        self.log(Level::Fatal, message);
        std::process::exit(1)
    }

    pub fn panic(self, message: impl Into<String>) -> ! {
        let message = message.into();
        self.log(Level::Panic, message.clone());
        panic!("{message}")
    }
}
