//! Directory-backed object store
//!
//! Buckets are sub-directories of a root directory and keys are relative file
//! paths inside them, so `root/dev-ui-web-static-assets/app.js` is the object
//! `app.js` in bucket `dev-ui-web-static-assets`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{ObjectStore, StoreError, StoredObject};
use crate::resolver::StorageKey;

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        let dir = self.root.join(bucket);
        match fs::canonicalize(&dir).await {
            Ok(p) => Ok(p),
            // A missing bucket is a deployment problem, not a missing key
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::Unavailable(format!(
                "bucket directory '{}' does not exist",
                dir.display()
            ))),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, bucket: &str, key: &StorageKey) -> Result<StoredObject, StoreError> {
        let bucket_dir = self.bucket_dir(bucket).await?;
        let file_path = bucket_dir.join(key.as_str());

        let canonical = match fs::canonicalize(&file_path).await {
            Ok(p) => p,
            Err(e) => return Err(map_io_error(e, bucket, key)),
        };

        // Security: symlinks must not lead outside the bucket
        if !canonical.starts_with(&bucket_dir) {
            tracing::warn!(
                key = %key,
                resolved = %canonical.display(),
                "symlink escapes bucket directory"
            );
            return Err(StoreError::denied(bucket, key));
        }

        let metadata = fs::metadata(&canonical)
            .await
            .map_err(|e| map_io_error(e, bucket, key))?;
        if metadata.is_dir() {
            return Err(StoreError::not_found(bucket, key));
        }

        let content = fs::read(&canonical)
            .await
            .map_err(|e| map_io_error(e, bucket, key))?;
        Ok(StoredObject::new(content))
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

fn map_io_error(err: std::io::Error, bucket: &str, key: &StorageKey) -> StoreError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => StoreError::not_found(bucket, key),
        ErrorKind::PermissionDenied => StoreError::denied(bucket, key),
        _ => StoreError::Io(err),
    }
}
