use super::config::LoggerConfig;
use crate::logger::{Logger, Output};
use crate::sender::DeliveryHook;

/// Assembles the logger for a resolved config: level, console format, the
/// output writer and, when enabled, the Elasticsearch delivery hook.
///
/// A sink client that cannot be built is reported on `diagnostics` and the
/// logger falls back to console-only output.
pub fn build_logger(config: &LoggerConfig, output: Output, diagnostics: Output) -> Logger {
    let mut builder = Logger::builder()
        .level(config.level)
        .console_format(config.console_format)
        .output(output);

    if config.elasticsearch.enabled {
        match DeliveryHook::from_config(&config.elasticsearch) {
            Ok(hook) => builder = builder.sink(hook.with_diagnostics(diagnostics)),
            Err(e) => {
                diagnostics.write_line(&format!("logger: failed to create elasticsearch client: {e}"));
            }
        }
    }

    builder.build()
}
