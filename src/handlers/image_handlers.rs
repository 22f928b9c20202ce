//! HTTP handlers for the image resource.
//!
//! Each handler translates one verb+path into exactly one `GalleryService`
//! call plus status mapping; no business logic lives here.

use crate::{
    AppState,
    errors::AppError,
    models::image::{Image, ImageDetail, ImageSummary},
    services::gallery_service::{ImagePatch, NewImage},
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

/// Request body for `POST /api/images`. The `url` comes from a completed
/// upload; the two calls are not transactional (see the orphan sweep task).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub url: String,
}

/// Request body for `PUT /api/images/{id}`. Absent fields keep their
/// stored values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// `GET /api/images` — all images, newest first.
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageSummary>>, AppError> {
    let images = state.gallery.list_images().await?;
    Ok(Json(images))
}

/// `POST /api/images` — persist a new image record.
pub async fn create_image(
    State(state): State<AppState>,
    Json(req): Json<CreateImageRequest>,
) -> Result<Json<Image>, AppError> {
    let image = state
        .gallery
        .create_image(NewImage {
            name: req.name,
            description: req.description,
            tags: req.tags,
            url: req.url,
        })
        .await?;

    tracing::info!(image = %image.id, "created image");
    Ok(Json(image))
}

/// `GET /api/images/{id}` — one image with its comments, newest first.
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImageDetail>, AppError> {
    let detail = state.gallery.get_image(id).await?;
    Ok(Json(detail))
}

/// `PUT /api/images/{id}` — overwrite the mutable fields.
pub async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateImageRequest>,
) -> Result<Json<Image>, AppError> {
    let image = state
        .gallery
        .update_image(
            id,
            ImagePatch {
                name: req.name,
                description: req.description,
                tags: req.tags,
            },
        )
        .await?;

    Ok(Json(image))
}

/// `DELETE /api/images/{id}` — remove the image and its comments.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.gallery.delete_image(id).await?;
    tracing::info!(image = %id, "deleted image");
    Ok(Json(json!({ "message": "Image deleted successfully" })))
}
