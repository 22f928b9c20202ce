//! Orphaned-file sweep.
//!
//! Upload and record-create are two independent calls; a crash between them
//! leaves a stored file no image record references. This sweep reconciles
//! the storage directory against `images.url`, removing unreferenced files
//! once they are older than a grace age (so in-flight uploads survive).

use crate::services::storage_service::StorageService;
use anyhow::Result;
use sqlx::SqlitePool;
use std::time::Duration;

/// Grace age before an unreferenced file is considered orphaned.
pub const DEFAULT_MIN_AGE: Duration = Duration::from_secs(3600);

/// Counts reported after a sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Stored keys examined.
    pub scanned: usize,
    /// Unreferenced, mature files removed.
    pub removed: usize,
    /// Files kept because they were younger than the grace age.
    pub kept_young: usize,
}

/// Sweep the storage directory once. Idempotent and restartable: files
/// already removed simply no longer appear in the listing.
pub async fn run(
    db: &SqlitePool,
    storage: &StorageService,
    min_age: Duration,
) -> Result<SweepReport> {
    let mut report = SweepReport::default();

    for stored in storage.list_keys().await? {
        report.scanned += 1;

        // Keys are uuid-dot-extension, so a suffix match on the stored URL
        // cannot produce false positives across keys.
        let referenced: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM images WHERE url LIKE ?)")
                .bind(format!("%/media/{}", stored.key))
                .fetch_one(db)
                .await?;
        if referenced != 0 {
            continue;
        }

        let age = stored.modified.elapsed().unwrap_or(Duration::ZERO);
        if age < min_age {
            report.kept_young += 1;
            continue;
        }

        storage.remove_image(&stored.key).await?;
        report.removed += 1;
        tracing::info!(key = %stored.key, "removed orphaned stored file");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gallery_service::{GalleryService, NewImage};
    use crate::tests::test_utils::test_pool;
    use bytes::Bytes;
    use url::Url;

    fn storage(dir: &tempfile::TempDir) -> StorageService {
        StorageService::new(
            dir.path().to_path_buf(),
            Url::parse("http://localhost:3000").unwrap(),
        )
    }

    #[tokio::test]
    async fn removes_only_unreferenced_mature_files() {
        let db = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        let gallery = GalleryService::new(db.clone());

        let referenced = storage
            .store_image(Bytes::from_static(b"kept"), "kept.png", None)
            .await
            .unwrap();
        gallery
            .create_image(NewImage {
                name: "kept".into(),
                description: "still referenced".into(),
                tags: vec![],
                url: referenced.url.clone(),
            })
            .await
            .unwrap();

        let orphan = storage
            .store_image(Bytes::from_static(b"orphan"), "orphan.png", None)
            .await
            .unwrap();

        // zero grace age: everything unreferenced is mature
        let report = run(&db, &storage, Duration::ZERO).await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.removed, 1);

        assert!(storage.open_image(&referenced.key).await.is_ok());
        assert!(storage.open_image(&orphan.key).await.is_err());
    }

    #[tokio::test]
    async fn young_orphans_survive_the_grace_age() {
        let db = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let orphan = storage
            .store_image(Bytes::from_static(b"fresh"), "fresh.png", None)
            .await
            .unwrap();

        let report = run(&db, &storage, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(report.removed, 0);
        assert_eq!(report.kept_young, 1);
        assert!(storage.open_image(&orphan.key).await.is_ok());
    }

    #[tokio::test]
    async fn rerun_after_sweep_is_a_noop() {
        let db = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        storage
            .store_image(Bytes::from_static(b"orphan"), "orphan.png", None)
            .await
            .unwrap();

        let first = run(&db, &storage, Duration::ZERO).await.unwrap();
        assert_eq!(first.removed, 1);

        let second = run(&db, &storage, Duration::ZERO).await.unwrap();
        assert_eq!(second.scanned, 0);
        assert_eq!(second.removed, 0);
    }
}
