//! The backup pipeline
//!
//! A run moves through
//! `Validating → Naming → Archiving → Opening → Uploading → Verifying → CleaningUp → Done`.
//! Any failure before `CleaningUp` ends the run with a [`BackupError`] that
//! names the stage. Cleanup problems are only reported in the
//! [`BackupReport`].
//!
//! Local cleanup runs only after the remote copy has been verified, so a
//! failed run leaves the local archive on disk.

use std::fmt;
use std::path::PathBuf;

mod cleanup;
mod error;
mod pipeline;
mod uploader;
mod verifier;

pub use cleanup::{remove_local_archive, CleanupOutcome};
pub use error::{BackupError, UploadError};
pub use pipeline::{BackupPipeline, BackupReport};
pub use uploader::{upload_chunks, UploadStats, CHUNK_SIZE};
pub use verifier::verify_upload;

/// Steps of a backup run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Naming,
    Archiving,
    Opening,
    Uploading,
    Verifying,
    CleaningUp,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Naming => "naming",
            Stage::Archiving => "archiving",
            Stage::Opening => "opening",
            Stage::Uploading => "uploading",
            Stage::Verifying => "verifying",
            Stage::CleaningUp => "cleaning_up",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// The archive produced by one run: its object name and local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    pub name: String,
    pub path: PathBuf,
}
