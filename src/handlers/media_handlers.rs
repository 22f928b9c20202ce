//! Upload and media-serving handlers.
//!
//! Uploads buffer the multipart field and hand the bytes to
//! `StorageService`; serving streams the payload back out without loading
//! it into memory.

use crate::{
    AppState,
    errors::AppError,
    services::storage_service::{StorageError, content_type_for},
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::Serialize;
use tokio_util::io::ReaderStream;

/// Response body for a completed upload: the public URL the caller passes
/// into `POST /api/images`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// `POST /admin/upload` — store a multipart `file` field and return its
/// public URL. No retry on failure; the caller resubmits.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        let stored = state
            .storage
            .store_image(bytes, &filename, content_type.as_deref())
            .await?;

        tracing::info!(key = %stored.key, filename = %filename, "stored uploaded image");
        return Ok(Json(UploadResponse { url: stored.url }));
    }

    Err(StorageError::MissingFile.into())
}

/// `GET /media/{key}` — stream a stored payload with a short cache
/// lifetime hint.
pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let (file, len) = state.storage.open_image(&key).await?;
    let stream = ReaderStream::new(file);

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&key)),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&len.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
