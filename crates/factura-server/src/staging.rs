//! Temporary on-disk copies of uploaded documents.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::trace;
use uuid::Uuid;

/// An upload written to a uniquely named temporary file.
///
/// The file is deleted when this value is dropped, whatever the outcome of
/// the request.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write `data` into a fresh file under `dir`.
    ///
    /// The name is derived from `request_id` plus a random suffix, never
    /// from the client-supplied filename.
    pub async fn write(dir: &Path, request_id: Uuid, data: &[u8]) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let file = tempfile::Builder::new()
            .prefix(&format!("upload-{}-", request_id))
            .suffix(".pdf")
            .tempfile_in(dir)?;
        tokio::fs::write(file.path(), data).await?;

        trace!("Staged {} bytes at {}", data.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_staged_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedUpload::write(dir.path(), Uuid::new_v4(), b"%PDF-1.5")
            .await
            .unwrap();

        let path = staged.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_request_id_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();

        let first = StagedUpload::write(dir.path(), id, b"first").await.unwrap();
        let second = StagedUpload::write(dir.path(), id, b"second").await.unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(std::fs::read(first.path()).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads").join("staging");

        let staged = StagedUpload::write(&nested, Uuid::new_v4(), b"x").await.unwrap();
        assert!(staged.path().starts_with(&nested));
    }
}
