use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::http;
use crate::storage::StorageClient;

/// Server settings. Storage settings come from `STORAGE_*` environment
/// variables, see [`crate::config::load_storage_config`].
#[derive(Parser, Debug, Clone)]
#[command(name = "files-api")]
#[command(about = "A REST API to upload, list and retrieve files in object storage")]
#[command(version)]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "FILES_API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "FILES_API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Largest accepted upload body in bytes
    #[arg(long, env = "FILES_API_MAX_UPLOAD_BYTES", default_value_t = 100 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

/// Serve the API until interrupted.
pub async fn run(args: Args, client: StorageClient) -> Result<()> {
    let app = http::router(client, args.max_upload_bytes);
    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    log::info!("files-api listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("files-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for shutdown signal: {e}");
    }
}
