//! File record lookup.
//!
//! The metadata store behind the file views is an external service; the app
//! only needs "give me the record for this id". [`JsonDirFileStore`] serves
//! records from `<dir>/<file_id>.json`, which is how deployments without a
//! live store (and the tests) provide data.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::category::FileRecord;

/// Errors reading a file record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read file record {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed file record {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of file records by id.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Fetch one record. `Ok(None)` when no such file exists.
    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>, StoreError>;
}

/// Records stored as one JSON document per file.
pub struct JsonDirFileStore {
    dir: PathBuf,
}

impl JsonDirFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File ids are opaque tokens; anything that could escape the directory
    /// is treated as unknown.
    fn is_valid_id(file_id: &str) -> bool {
        !file_id.is_empty()
            && file_id.len() <= 128
            && file_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

#[async_trait]
impl FileStore for JsonDirFileStore {
    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>, StoreError> {
        if !Self::is_valid_id(file_id) {
            return Ok(None);
        }

        let path = self.dir.join(format!("{file_id}.json"));
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        match serde_json::from_slice(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(source) => {
                warn!(path = %path.display(), error = %source, "malformed file record");
                Err(StoreError::Parse { path, source })
            }
        }
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn id_validation() {
        assert!(JsonDirFileStore::is_valid_id("4f2a-1c_9"));
        assert!(!JsonDirFileStore::is_valid_id(""));
        assert!(!JsonDirFileStore::is_valid_id("../secret"));
        assert!(!JsonDirFileStore::is_valid_id("a/b"));
        assert!(!JsonDirFileStore::is_valid_id("a.json"));
    }

    #[tokio::test]
    async fn reads_records_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("abc.json"),
            r#"{"view": {"file_type": "video", "tags": ["movie"]}}"#,
        )
        .unwrap();

        let store = JsonDirFileStore::new(dir.path());
        let record = store.get("abc").await.unwrap().unwrap();
        assert_eq!(record.view.file_type, "video");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();

        let store = JsonDirFileStore::new(dir.path());
        assert!(matches!(
            store.get("bad").await,
            Err(StoreError::Parse { .. })
        ));
    }
}
