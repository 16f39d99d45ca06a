use clap::Parser;
use tracing_subscriber::EnvFilter;

use files_api::cli;
use files_api::cli::Args;
use files_api::config::load_storage_config;
use files_api::error::Result;
use files_api::storage::StorageClient;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = load_storage_config()?;
    let client = StorageClient::new(config).await?;
    cli::run(args, client).await?;
    Ok(())
}
