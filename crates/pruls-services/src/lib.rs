//! Pruls Services Library
//!
//! Archive creation and the backup pipeline: validate, name, archive, upload,
//! verify, clean up.

pub mod archive;
pub mod backup;

pub use archive::{ArchiveError, Archiver, TarGzArchiver};
pub use backup::{
    ArchiveDescriptor, BackupError, BackupPipeline, BackupReport, CleanupOutcome, Stage,
    UploadError, UploadStats, CHUNK_SIZE,
};
