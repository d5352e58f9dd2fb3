use clap::Parser;
use silo_cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_log::LogTracer::init();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match silo_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            ExitCode::FAILURE
        }
    }
}
