//! Represents a gallery image and its API projections.

use crate::models::comment::Comment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// A single image in the portfolio.
///
/// The row stores metadata only; the payload lives in media storage and is
/// referenced by `url`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Unique identifier, generated at creation and immutable afterwards.
    pub id: Uuid,

    /// Display title.
    pub name: String,

    /// Free-text description.
    pub description: String,

    /// Ordered tag list. Entries are non-empty trimmed strings; insertion
    /// order is display order.
    pub tags: Json<Vec<String>>,

    /// Deprecated single-tag field superseded by `tags`. Kept only so the
    /// migration task can read it; never exposed through the API.
    #[serde(skip)]
    pub legacy_tag: Option<String>,

    /// Absolute URL into media storage, set once at creation.
    pub url: String,

    /// Creation timestamp; gallery listings sort on this, descending.
    pub created_at: DateTime<Utc>,
}

/// Projection returned by the gallery listing: everything a grid cell needs,
/// nothing more.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub url: String,
    pub tags: Json<Vec<String>>,
}

/// Detail-page payload: the image plus its comments, newest first.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetail {
    #[serde(flatten)]
    pub image: Image,
    pub comments: Vec<Comment>,
}
