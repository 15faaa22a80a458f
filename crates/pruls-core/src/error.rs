//! Error types module
//!
//! Configuration problems are split in two: `ConfigError` covers options that
//! are missing or cannot be parsed (reported at startup), `ValidationError`
//! covers paths that do not exist or lack the access the backup needs.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Required option {0} is not set")]
    Missing(&'static str),

    #[error("Required option {0} must not be empty")]
    Empty(&'static str),

    #[error("Invalid value for option {option}: {reason}")]
    Invalid {
        option: &'static str,
        reason: String,
    },
}

/// A failed path check. Every variant names the offending path.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("storage credentials (e.g. .json) must exist, not found at: {}", path.display())]
    CredentialsMissing { path: PathBuf },

    #[error("backup target dir must exist, not found at: {}", path.display())]
    TargetDirMissing { path: PathBuf },

    #[error("storage credentials at {} are not readable: {source}", path.display())]
    CredentialsUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("backup target dir {} is not readable: {source}", path.display())]
    TargetDirUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive work dir {} is not writable: {source}", path.display())]
    WorkDirNotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ValidationError {
    /// The path whose check failed.
    pub fn path(&self) -> &Path {
        match self {
            ValidationError::CredentialsMissing { path }
            | ValidationError::TargetDirMissing { path }
            | ValidationError::CredentialsUnreadable { path, .. }
            | ValidationError::TargetDirUnreadable { path, .. }
            | ValidationError::WorkDirNotWritable { path, .. } => path.as_path(),
        }
    }
}
