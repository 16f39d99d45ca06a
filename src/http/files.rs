//! `/files` handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use jiff::Timestamp;
use jiff::fmt::rfc2822::DateTimePrinter;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{Error, Result};
use crate::query::{ListParams, ListQuery};
use crate::storage::ObjectMeta;
use crate::storage::constants::DEFAULT_CONTENT_TYPE;
use crate::storage::model::FileMetadata;
use crate::storage::utils::path::is_valid_path;

/// Multipart field names accepted for the uploaded file.
const FILE_FIELDS: [&str; 2] = ["file_content", "file"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutFileResponse {
    pub file_path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<FileMetadata>,
    pub next_page_token: Option<String>,
}

/// `PUT /files/{path}`: create or overwrite a file from a multipart upload.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<PutFileResponse>)> {
    if !is_valid_path(&file_path) {
        return Err(Error::InvalidPath { path: file_path });
    }
    let mut multipart = multipart.map_err(|rejection| Error::MalformedUpload {
        message: rejection.body_text(),
    })?;

    let (content, content_type) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| Error::MalformedUpload {
                message: e.body_text(),
            })?
            .ok_or_else(|| Error::MalformedUpload {
                message: "missing file_content field".to_string(),
            })?;
        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let content = field.bytes().await.map_err(|e| Error::MalformedUpload {
            message: e.body_text(),
        })?;
        break (content, content_type);
    };

    let outcome = state
        .storage
        .upload(&file_path, content, &content_type)
        .await?;

    let (status, message) = if outcome.created {
        (
            StatusCode::CREATED,
            format!("File uploaded successfully at path: /{file_path}"),
        )
    } else {
        (
            StatusCode::OK,
            format!("File already exists at path: /{file_path}"),
        )
    };
    log::info!("upload {file_path} status={status}");

    Ok((status, Json(PutFileResponse { file_path, message })))
}

/// `GET /files`: one page of file metadata.
pub async fn list_files(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListFilesResponse>> {
    let Query(params) = params.map_err(|rejection| Error::InvalidQuery {
        message: rejection.body_text(),
    })?;
    let query = ListQuery::from_params(params)?;
    let page = state.storage.list_page(&query).await?;

    Ok(Json(ListFilesResponse {
        files: page.items,
        next_page_token: page.next_cursor,
    }))
}

/// `HEAD /files/{path}`: metadata headers with an empty body.
pub async fn head_file(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> Result<Response> {
    let meta = state.storage.stat(&file_path).await?;
    Ok((StatusCode::OK, metadata_headers(&meta)).into_response())
}

/// `GET /files/{path}`: stream the file content.
pub async fn get_file(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> Result<Response> {
    let object = state.storage.fetch(&file_path).await?;
    let headers = metadata_headers(&object.meta);
    Ok((StatusCode::OK, headers, Body::from_stream(object.body)).into_response())
}

/// `DELETE /files/{path}`: 404 when the file does not exist.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> Result<StatusCode> {
    if !state.storage.exists(&file_path).await? {
        return Err(Error::NotFound { path: file_path });
    }
    state.storage.delete(&file_path).await?;
    log::info!("deleted {file_path}");
    Ok(StatusCode::OK)
}

fn metadata_headers(meta: &ObjectMeta) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.size));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&meta.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    if let Some(value) = meta
        .last_modified
        .and_then(http_date)
        .and_then(|date| HeaderValue::from_str(&date).ok())
    {
        headers.insert(header::LAST_MODIFIED, value);
    }
    headers
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
fn http_date(timestamp: Timestamp) -> Option<String> {
    DateTimePrinter::new()
        .timestamp_to_rfc9110_string(&timestamp)
        .ok()
}
