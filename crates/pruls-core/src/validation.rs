//! Filesystem checks run before any backup work starts.
//!
//! Checks are evaluated in a fixed order and stop at the first failure:
//!
//! 1. the credentials file exists
//! 2. the target directory exists
//! 3. the credentials file is readable
//! 4. the target directory is readable
//! 5. the work directory is writable

use std::fs;
use std::path::Path;

use crate::config::BackupConfig;
use crate::error::ValidationError;

pub fn validate_config(config: &BackupConfig) -> Result<(), ValidationError> {
    if !path_exists(&config.credentials_path) {
        return Err(ValidationError::CredentialsMissing {
            path: config.credentials_path.clone(),
        });
    }
    if !path_exists(&config.target_dir) {
        return Err(ValidationError::TargetDirMissing {
            path: config.target_dir.clone(),
        });
    }

    fs::File::open(&config.credentials_path).map_err(|source| {
        ValidationError::CredentialsUnreadable {
            path: config.credentials_path.clone(),
            source,
        }
    })?;

    fs::read_dir(&config.target_dir).map_err(|source| ValidationError::TargetDirUnreadable {
        path: config.target_dir.clone(),
        source,
    })?;

    check_writable(config.work_dir()).map_err(|source| ValidationError::WorkDirNotWritable {
        path: config.work_dir.clone(),
        source,
    })?;

    tracing::debug!(
        credentials = %config.credentials_path.display(),
        target_dir = %config.target_dir.display(),
        work_dir = %config.work_dir.display(),
        "Configuration paths validated"
    );

    Ok(())
}

fn path_exists(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

/// Create and drop a probe file. Permission bits alone do not account for
/// read-only mounts or ACLs.
fn check_writable(dir: &Path) -> std::io::Result<()> {
    let probe = tempfile::Builder::new()
        .prefix(".pruls-probe")
        .tempfile_in(dir)?;
    probe.close()
}
