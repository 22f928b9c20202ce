//! Legacy-tag migration: convert the deprecated singular `legacy_tag` field
//! into a one-element tag list.
//!
//! Only images whose tag list is still empty are touched, which makes a
//! rerun a no-op; interrupting the task and restarting it is safe.

use crate::models::image::Image;
use sqlx::SqlitePool;
use sqlx::types::Json;

/// Counts reported after a migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Total image rows examined.
    pub scanned: usize,
    /// Rows whose tag list was set from the legacy field.
    pub migrated: usize,
    /// Rows whose update failed; logged and skipped, never fatal.
    pub failed: usize,
}

/// Run the migration over every image, exactly once per record.
///
/// A failing record is logged and skipped so one bad row cannot abort the
/// rest of the run; only the initial scan query is fatal.
pub async fn run(db: &SqlitePool) -> Result<MigrationReport, sqlx::Error> {
    let images = sqlx::query_as::<_, Image>(
        "SELECT id, name, description, tags, legacy_tag, url, created_at FROM images",
    )
    .fetch_all(db)
    .await?;

    let mut report = MigrationReport {
        scanned: images.len(),
        ..Default::default()
    };

    for image in images {
        let legacy = match image.legacy_tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag,
            _ => continue,
        };
        if !image.tags.0.is_empty() {
            continue;
        }

        let update = sqlx::query("UPDATE images SET tags = ? WHERE id = ?")
            .bind(Json(vec![legacy.to_string()]))
            .bind(image.id)
            .execute(db)
            .await;

        match update {
            Ok(_) => {
                report.migrated += 1;
                tracing::info!(image = %image.id, tag = legacy, "migrated legacy tag");
            }
            Err(err) => {
                report.failed += 1;
                tracing::warn!(image = %image.id, error = %err, "tag migration failed for record, continuing");
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_utils::test_pool;
    use chrono::Utc;
    use uuid::Uuid;

    async fn seed_image(db: &SqlitePool, legacy: Option<&str>, tags: Vec<String>) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO images (id, name, description, tags, legacy_tag, url, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind("seeded")
        .bind("seeded image")
        .bind(Json(tags))
        .bind(legacy)
        .bind("http://localhost:3000/media/seed.png")
        .bind(Utc::now())
        .execute(db)
        .await
        .unwrap();
        id
    }

    async fn tags_of(db: &SqlitePool, id: Uuid) -> Vec<String> {
        let tags: Json<Vec<String>> =
            sqlx::query_scalar("SELECT tags FROM images WHERE id = ?")
                .bind(id)
                .fetch_one(db)
                .await
                .unwrap();
        tags.0
    }

    #[tokio::test]
    async fn migrates_only_eligible_records() {
        let db = test_pool().await;

        let eligible = seed_image(&db, Some("Landscape"), vec![]).await;
        let already_tagged = seed_image(&db, Some("Old"), vec!["new".into()]).await;
        let no_legacy = seed_image(&db, None, vec![]).await;
        let blank_legacy = seed_image(&db, Some("   "), vec![]).await;

        let report = run(&db).await.unwrap();
        assert_eq!(report.scanned, 4);
        assert_eq!(report.migrated, 1);
        assert_eq!(report.failed, 0);

        assert_eq!(tags_of(&db, eligible).await, vec!["Landscape"]);
        assert_eq!(tags_of(&db, already_tagged).await, vec!["new"]);
        assert!(tags_of(&db, no_legacy).await.is_empty());
        assert!(tags_of(&db, blank_legacy).await.is_empty());
    }

    #[tokio::test]
    async fn second_run_is_a_noop() {
        let db = test_pool().await;
        let id = seed_image(&db, Some("Portrait"), vec![]).await;

        let first = run(&db).await.unwrap();
        assert_eq!(first.migrated, 1);

        let second = run(&db).await.unwrap();
        assert_eq!(second.migrated, 0);
        assert_eq!(second.failed, 0);
        assert_eq!(tags_of(&db, id).await, vec!["Portrait"]);
    }
}
