use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use jboxctl::cli::{self, Cli};

/// Log filter variable; falls back to `RUST_LOG`, then `warn`.
const LOG_ENV: &str = "JBOX_LOG";

fn init_tracing() -> Result<()> {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let filter = EnvFilter::try_new(&directives)
        .or_else(|_| EnvFilter::try_new("warn"))
        .wrap_err("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing()?;

    cli::run(cli).await
}
