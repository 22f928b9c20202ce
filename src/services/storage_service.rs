//! StorageService — the object-storage gateway for image payloads.
//!
//! Metadata lives in SQLite (owned by `GalleryService`); this service only
//! touches the flat storage directory where payload bytes live under
//! collision-resistant keys, and mints the public URLs that image records
//! carry.

use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
    time::SystemTime,
};
use thiserror::Error;
use tokio::{
    fs::{self, File, OpenOptions},
    io::AsyncWriteExt,
};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no file provided")]
    MissingFile,
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("storage key `{0}` already exists")]
    KeyCollision(String),
    #[error("stored file `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A successfully stored payload: the key within the bucket directory and
/// the public URL callers persist on the image record.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

/// A key listed from the bucket, with its modification time for the orphan
/// sweep's grace-age check.
#[derive(Debug, Clone)]
pub struct StoredKey {
    pub key: String,
    pub modified: SystemTime,
}

const MAX_EXT_LEN: usize = 8;

/// StorageService provides the three object-storage operations the gallery
/// needs:
/// - store an uploaded payload under a fresh random key (never clobbering)
/// - open a stored payload for streaming out
/// - list stored keys so the sweep task can reconcile against the database
#[derive(Clone)]
pub struct StorageService {
    /// Directory on disk where payloads are stored, one file per key.
    pub base_path: PathBuf,

    /// Public base URL; stored media resolves at `{public_base}/media/{key}`.
    pub public_base: Url,
}

impl StorageService {
    pub fn new(base_path: impl Into<PathBuf>, public_base: Url) -> Self {
        Self {
            base_path: base_path.into(),
            public_base,
        }
    }

    /// Store an uploaded payload and return its key and public URL.
    ///
    /// The key combines a random token with the original file extension, so
    /// identically named uploads never collide. The target is opened with
    /// `create_new`: a duplicate key is rejected rather than overwritten,
    /// and the caller resubmits. Bytes are flushed and fsynced before the
    /// key is handed out; a failed write removes the partial file.
    pub async fn store_image(
        &self,
        bytes: Bytes,
        original_filename: &str,
        content_type: Option<&str>,
    ) -> StorageResult<StoredImage> {
        if bytes.is_empty() {
            return Err(StorageError::MissingFile);
        }

        let ext = extension_for(original_filename, content_type);
        let key = format!("{}.{}", Uuid::new_v4(), ext);

        fs::create_dir_all(&self.base_path).await?;
        let path = self.base_path.join(&key);
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::KeyCollision(key));
            }
            Err(err) => return Err(StorageError::Io(err)),
        };

        if let Err(err) = file.write_all(&bytes).await {
            let _ = fs::remove_file(&path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&path).await;
            return Err(StorageError::Io(err));
        }

        let url = self.media_url(&key);
        Ok(StoredImage { key, url })
    }

    /// Open a stored payload for streaming, returning the file handle and
    /// its byte length.
    pub async fn open_image(&self, key: &str) -> StorageResult<(File, u64)> {
        self.ensure_key_safe(key)?;

        let path = self.base_path.join(key);
        let file = File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Io(err)
            }
        })?;
        let len = file.metadata().await?.len();

        Ok((file, len))
    }

    /// List every stored key with its modification time. Temp files and
    /// dotfiles are skipped.
    pub async fn list_keys(&self) -> StorageResult<Vec<StoredKey>> {
        let mut keys = Vec::new();
        let mut dir = match fs::read_dir(&self.base_path).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(keys),
            Err(err) => return Err(StorageError::Io(err)),
        };

        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(key) = name.to_str() else { continue };
            if key.starts_with('.') {
                continue;
            }
            keys.push(StoredKey {
                key: key.to_string(),
                modified: meta.modified()?,
            });
        }

        Ok(keys)
    }

    /// Delete a stored payload. Missing files are fine; the sweep may race
    /// a manual cleanup.
    pub async fn remove_image(&self, key: &str) -> StorageResult<()> {
        self.ensure_key_safe(key)?;
        match fs::remove_file(self.base_path.join(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Public URL for a stored key.
    pub fn media_url(&self, key: &str) -> String {
        let base = self.public_base.as_str().trim_end_matches('/');
        format!("{}/media/{}", base, key)
    }

    /// Reject keys that could escape the storage directory. Generated keys
    /// always pass; this guards the serving path, which takes the key from
    /// the request.
    fn ensure_key_safe(&self, key: &str) -> StorageResult<()> {
        let invalid = key.is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
            || key.bytes().any(|b| b.is_ascii_control());
        if invalid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(())
    }
}

/// Pick a file extension for the storage key: the original filename's
/// extension when it looks sane, else one inferred from the content type,
/// else `bin`.
fn extension_for(original_filename: &str, content_type: Option<&str>) -> String {
    if let Some((stem, ext)) = original_filename.rsplit_once('.') {
        let sane = !stem.is_empty()
            && !ext.is_empty()
            && ext.len() <= MAX_EXT_LEN
            && ext.bytes().all(|b| b.is_ascii_alphanumeric());
        if sane {
            return ext.to_ascii_lowercase();
        }
    }

    match content_type {
        Some("image/png") => "png",
        Some("image/jpeg") => "jpg",
        Some("image/gif") => "gif",
        Some("image/webp") => "webp",
        Some("image/svg+xml") => "svg",
        Some("image/avif") => "avif",
        _ => "bin",
    }
    .to_string()
}

/// Content type for serving a stored key, derived from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &tempfile::TempDir) -> StorageService {
        StorageService::new(
            dir.path().to_path_buf(),
            Url::parse("http://localhost:3000").unwrap(),
        )
    }

    #[tokio::test]
    async fn identically_named_uploads_get_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(&dir);

        let first = storage
            .store_image(Bytes::from_static(b"one"), "sunset.png", None)
            .await
            .unwrap();
        let second = storage
            .store_image(Bytes::from_static(b"two"), "sunset.png", None)
            .await
            .unwrap();

        assert_ne!(first.key, second.key);
        assert!(first.key.ends_with(".png"));
        assert!(second.key.ends_with(".png"));
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(&dir);

        let err = storage
            .store_image(Bytes::new(), "sunset.png", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingFile));
    }

    #[tokio::test]
    async fn stored_bytes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(&dir);

        let stored = storage
            .store_image(Bytes::from_static(b"payload"), "art.webp", None)
            .await
            .unwrap();
        assert_eq!(
            stored.url,
            format!("http://localhost:3000/media/{}", stored.key)
        );

        let (mut file, len) = storage.open_image(&stored.key).await.unwrap();
        assert_eq!(len, 7);
        let mut contents = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut file, &mut contents)
            .await
            .unwrap();
        assert_eq!(contents, b"payload");
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(&dir);

        for key in ["../secret", "a/b.png", "", "evil\\key"] {
            let err = storage.open_image(key).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key: {key:?}");
        }
    }

    #[test]
    fn extension_prefers_filename_then_content_type() {
        assert_eq!(extension_for("photo.JPG", None), "jpg");
        assert_eq!(extension_for("noext", Some("image/png")), "png");
        assert_eq!(extension_for("weird.name.tar.gz", None), "gz");
        assert_eq!(extension_for("dots...", None), "bin");
        assert_eq!(extension_for("noext", None), "bin");
    }

    #[test]
    fn content_types_map_by_extension() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("mystery"), "application/octet-stream");
    }
}
