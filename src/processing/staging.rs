//! Temporary storage for uploads awaiting extraction.
//!
//! Each upload is written under a fresh UUID so identical original names never overwrite each
//! other; the original name travels separately and is only used to label output. The staged file
//! is deleted when its [`StagedFile`] handle is dropped.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name supplied by the client.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Convenience constructor.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Writes uploads into a staging directory.
#[derive(Debug, Clone)]
pub struct UploadStager {
    dir: PathBuf,
}

impl UploadStager {
    /// Stage files under `dir`; the directory is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Staging directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `upload` under a unique name.
    pub async fn stage(&self, upload: &Upload) -> std::io::Result<StagedFile> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{id}.pdf"));
        tokio::fs::write(&path, &upload.bytes).await?;
        tracing::debug!(
            %id,
            original = %upload.file_name,
            bytes = upload.bytes.len(),
            "Staged upload"
        );
        Ok(StagedFile { id, path })
    }
}

/// Handle to a staged file; removes the file on drop.
#[derive(Debug)]
pub struct StagedFile {
    id: Uuid,
    path: PathBuf,
}

impl StagedFile {
    /// Internal identifier of the staged upload.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Location of the staged bytes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "Failed to remove staged upload"
                );
            }
        }
    }
}
