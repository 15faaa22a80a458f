//! Archive creation
//!
//! The pipeline only needs a file on disk that is completely written when
//! [`Archiver::create_archive`] returns. Format and compression are up to the
//! implementation.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

mod tar_gz;

pub use tar_gz::TarGzArchiver;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to create archive file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to add {} to archive: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to finalize archive {}: {source}", path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive {} would be written inside the directory being archived {}", output.display(), source_dir.display())]
    OutputInsideSource { output: PathBuf, source_dir: PathBuf },

    #[error("archive task failed: {0}")]
    Task(String),
}

/// Turns a directory into a single archive file.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Write an archive of `source_dir` to `output_path`, replacing any file
    /// already there.
    async fn create_archive(&self, source_dir: &Path, output_path: &Path)
        -> Result<(), ArchiveError>;
}
