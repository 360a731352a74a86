use clap::Parser;
use scripts::{cli::Cli, errors::ScriptError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli { global, command } = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    command.run(global).await
}
