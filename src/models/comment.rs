//! Represents a comment left on an image.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A visitor comment attached to one image.
///
/// Comments are created and deleted but never edited. They are listed
/// newest-first and are removed together with their owning image.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,

    /// Owning image; always references an existing row.
    pub image_id: Uuid,

    /// Free-text body, required and non-empty.
    pub content: String,

    pub created_at: DateTime<Utc>,
}
