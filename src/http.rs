//! HTTP surface: maps requests onto [`StorageClient`] calls and typed errors
//! onto status codes.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;

use crate::storage::StorageClient;

mod error;
mod files;

pub use error::ErrorBody;
pub use files::{ListFilesResponse, PutFileResponse};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub storage: StorageClient,
}

/// Build the application router.
///
/// The file routes are served both at the root and under `/v1`.
pub fn router(storage: StorageClient, max_upload_bytes: usize) -> Router {
    let files = Router::new()
        .route("/files", get(files::list_files))
        .route(
            "/files/{*file_path}",
            get(files::get_file)
                .head(files::head_file)
                .put(files::upload_file)
                .delete(files::delete_file),
        );

    Router::new()
        .merge(files.clone())
        .nest("/v1", files)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(AppState { storage })
}
