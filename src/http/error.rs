use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Status code for an error kind.
fn status_of(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::BackendUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let body = match kind {
            ErrorKind::Validation => {
                log::info!("rejected request: {self}");
                ErrorBody::new(root_message(&self))
            }
            ErrorKind::NotFound => ErrorBody::new("File not found"),
            ErrorKind::BackendUnavailable => {
                // Backend details stay in the log.
                log::error!("request failed: {self}");
                ErrorBody::new("Internal server error")
            }
        };
        (status_of(kind), Json(body)).into_response()
    }
}

/// Innermost message of a wrapped error, so clients see what was wrong with
/// their request rather than which operation failed.
fn root_message(error: &Error) -> String {
    match error {
        Error::ListFailed { source, .. }
        | Error::UploadFailed { source, .. }
        | Error::FetchFailed { source, .. }
        | Error::DeleteFailed { source, .. } => root_message(source),
        other => other.to_string(),
    }
}
