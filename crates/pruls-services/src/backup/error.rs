use std::io;
use std::path::PathBuf;

use pruls_core::ValidationError;
use pruls_storage::StorageError;

use super::Stage;
use crate::archive::ArchiveError;

/// Failure while streaming the local archive to remote storage.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to open remote object for writing: {0}")]
    Open(#[source] StorageError),

    #[error("failed to read local archive: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write chunk {chunk}: {source}")]
    Write {
        chunk: u64,
        #[source]
        source: StorageError,
    },

    #[error("failed to finalize remote object: {0}")]
    Finalize(#[source] StorageError),
}

/// A fatal backup failure. Every variant maps to the stage it happened in.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("configuration is invalid: {0}")]
    Validation(#[from] ValidationError),

    #[error("archive creation failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("failed to open local archive {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("upload of {name} failed: {source}")]
    Upload {
        name: String,
        #[source]
        source: UploadError,
    },

    #[error("verification of {bucket}/{name} failed: {source}")]
    Verify {
        bucket: String,
        name: String,
        #[source]
        source: StorageError,
    },
}

impl BackupError {
    pub fn stage(&self) -> Stage {
        match self {
            BackupError::Validation(_) => Stage::Validating,
            BackupError::Archive(_) => Stage::Archiving,
            BackupError::Open { .. } => Stage::Opening,
            BackupError::Upload { .. } => Stage::Uploading,
            BackupError::Verify { .. } => Stage::Verifying,
        }
    }
}
