//! GalleryService — the persistence gateway for images and comments.
//!
//! This is the only component that issues relational-store queries. Every
//! operation maps 1:1 to a resource handler and is a live round trip to
//! SQLite; no cache sits in front of it.

use crate::models::{
    comment::Comment,
    image::{Image, ImageDetail, ImageSummary},
};
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;
use std::sync::Arc;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Fields accepted when creating an image. The `url` must already point at
/// completed media storage; the upload happens before the record exists.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub url: String,
}

/// Partial overwrite of the three mutable image fields. `None` keeps the
/// stored value.
#[derive(Debug, Clone, Default)]
pub struct ImagePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub image_id: Uuid,
}

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy)]
pub struct GalleryStats {
    pub images: i64,
    pub comments: i64,
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("image `{0}` not found")]
    ImageNotFound(Uuid),
    #[error("comment `{0}` not found")]
    CommentNotFound(Uuid),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type GalleryResult<T> = Result<T, GalleryError>;

const IMAGE_COLUMNS: &str = "id, name, description, tags, legacy_tag, url, created_at";

/// GalleryService provides the CRUD surface over the relational store:
/// - list/get/create/update/delete images
/// - create/delete comments
/// - aggregate counts for the dashboard
///
/// Handlers stay stateless; all persistence concerns live here.
#[derive(Clone)]
pub struct GalleryService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl GalleryService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// All images, newest first, projected down to what the gallery grid
    /// renders. An empty gallery is an empty vec, not an error.
    pub async fn list_images(&self) -> GalleryResult<Vec<ImageSummary>> {
        let images = sqlx::query_as::<_, ImageSummary>(
            "SELECT id, name, description, url, tags
             FROM images ORDER BY created_at DESC",
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(images)
    }

    /// One image plus its comments, newest comment first.
    pub async fn get_image(&self, id: Uuid) -> GalleryResult<ImageDetail> {
        let image = self.fetch_image(id).await?;

        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, image_id, content, created_at
             FROM comments WHERE image_id = ? ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(&*self.db)
        .await?;

        Ok(ImageDetail { image, comments })
    }

    /// Persist a new image record with a generated id and timestamp.
    ///
    /// Required fields and URL syntax are checked here; tags are normalized
    /// (trimmed, blanks dropped) with their order preserved.
    pub async fn create_image(&self, new: NewImage) -> GalleryResult<Image> {
        let name = required(&new.name, "name")?;
        let description = required(&new.description, "description")?;
        let url = required(&new.url, "url")?;
        Url::parse(&url)
            .map_err(|_| GalleryError::Validation(format!("`{}` is not a valid URL", url)))?;
        let tags = normalize_tags(new.tags);

        let image = sqlx::query_as::<_, Image>(&format!(
            "INSERT INTO images (id, name, description, tags, legacy_tag, url, created_at)
             VALUES (?, ?, ?, ?, NULL, ?, ?)
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&description)
        .bind(Json(tags))
        .bind(&url)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        Ok(image)
    }

    /// Overwrite the mutable fields of an existing image. Absent patch
    /// fields keep their stored values; `url` and `created_at` never change.
    pub async fn update_image(&self, id: Uuid, patch: ImagePatch) -> GalleryResult<Image> {
        let current = self.fetch_image(id).await?;

        let name = match patch.name {
            Some(name) => required(&name, "name")?,
            None => current.name,
        };
        let description = patch.description.unwrap_or(current.description);
        let tags = patch.tags.map(normalize_tags).unwrap_or(current.tags.0);

        let image = sqlx::query_as::<_, Image>(&format!(
            "UPDATE images SET name = ?, description = ?, tags = ?
             WHERE id = ?
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(&name)
        .bind(&description)
        .bind(Json(tags))
        .bind(id)
        .fetch_one(&*self.db)
        .await?;

        Ok(image)
    }

    /// Remove an image and its comments in one transaction.
    ///
    /// SQLite only enforces the comments foreign key when the pragma is on,
    /// so the cascade is explicit here rather than left to the schema.
    pub async fn delete_image(&self, id: Uuid) -> GalleryResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM comments WHERE image_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls the comment delete back
            return Err(GalleryError::ImageNotFound(id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Persist a comment against an existing image.
    ///
    /// A nonexistent `image_id` is NotFound, not a bare constraint error, so
    /// the API surface stays consistent with the image routes.
    pub async fn create_comment(&self, new: NewComment) -> GalleryResult<Comment> {
        let content = required(&new.content, "content")?;

        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM images WHERE id = ?)")
            .bind(new.image_id)
            .fetch_one(&*self.db)
            .await?;
        if exists == 0 {
            return Err(GalleryError::ImageNotFound(new.image_id));
        }

        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, image_id, content, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, image_id, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.image_id)
        .bind(&content)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        Ok(comment)
    }

    /// Delete a single comment by id.
    pub async fn delete_comment(&self, id: Uuid) -> GalleryResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GalleryError::CommentNotFound(id));
        }

        Ok(())
    }

    /// Image and comment counts for the admin dashboard.
    pub async fn stats(&self) -> GalleryResult<GalleryStats> {
        let images: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&*self.db)
            .await?;
        let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&*self.db)
            .await?;

        Ok(GalleryStats { images, comments })
    }

    async fn fetch_image(&self, id: Uuid) -> GalleryResult<Image> {
        sqlx::query_as::<_, Image>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => GalleryError::ImageNotFound(id),
            other => GalleryError::Sqlx(other),
        })
    }
}

/// Reject blank required fields, returning the trimmed value otherwise.
fn required(value: &str, field: &str) -> GalleryResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GalleryError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trim tag entries and drop blanks, keeping insertion order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
