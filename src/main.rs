use clap::Parser;
use hydra::{HydraLayer, VERSION, greeting, must_setup};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "hydra", version, about = "Structured logger with Elasticsearch delivery")]
struct Cli {
    /// Logger config file; skips the directory search when set
    #[arg(long, env = "HYDRA_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logger = must_setup(cli.config.as_deref());

    // RUST_LOG can narrow the bridge further; the logger level still applies.
    let layer = HydraLayer::new(logger.clone());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(layer.level_filter().into()));
    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()?;

    logger
        .with_fields([
            ("service", Value::from("hydra")),
            ("event", Value::from("dummy_entry")),
            ("version", Value::from(VERSION)),
        ])
        .info("Dummy log entry: application initialized");

    tracing::debug!(config = ?cli.config, "setup complete");

    println!("{}", greeting());
    Ok(())
}
