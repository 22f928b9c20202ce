//! HTTP handlers for the comment resource.

use crate::{
    AppState, errors::AppError, models::comment::Comment, services::gallery_service::NewComment,
};
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

/// Request body for `POST /api/comments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub image_id: Uuid,
}

/// Request body for `DELETE /api/comments`. The id travels in the body,
/// matching the public surface.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub id: Uuid,
}

/// `POST /api/comments` — attach a comment to an existing image.
pub async fn create_comment(
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    let comment = state
        .gallery
        .create_comment(NewComment {
            content: req.content,
            image_id: req.image_id,
        })
        .await?;

    Ok(Json(comment))
}

/// `DELETE /api/comments` — remove one comment by id.
pub async fn delete_comment(
    State(state): State<AppState>,
    Json(req): Json<DeleteCommentRequest>,
) -> Result<Json<Value>, AppError> {
    state.gallery.delete_comment(req.id).await?;
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
