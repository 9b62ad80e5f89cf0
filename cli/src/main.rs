//! Surge - plan runner for distributed load tests

use clap::Parser;
use surge_cli::cli::Cli;
use surge_cli::commands::EXIT_FATAL;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.run().await {
        Ok(completion) => std::process::exit(completion.exit_code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(EXIT_FATAL);
        }
    }
}
