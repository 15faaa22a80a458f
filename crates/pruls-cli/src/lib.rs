use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::ValueEnum;
use pruls_core::{validate_config, BackupConfig};
use pruls_services::{BackupError, CleanupOutcome};
use pruls_storage::{create_storage, ObjectStorage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Initialize tracing for the binary. `RUST_LOG` overrides the default `info`
/// level.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

/// Load environment defaults from `path`, or from `./.env` when no path is
/// given. A missing default `.env` is not an error.
pub fn load_env_file(path: Option<&Path>) -> Result<(), dotenvy::Error> {
    match path {
        Some(path) => dotenvy::from_path(path),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e),
        },
    }
}

/// Check the configured paths, then build the storage client.
///
/// Backend constructors read the credentials file, so the path checks have to
/// come first for a bad path to be reported as a validation failure.
pub async fn connect_storage(config: &BackupConfig) -> anyhow::Result<Arc<dyn ObjectStorage>> {
    validate_config(config).map_err(|e| stage_failure(BackupError::from(e)))?;

    create_storage(config)
        .await
        .context("Failed to set up object storage")
}

/// Wrap a pipeline error with the stage it stopped in.
pub fn stage_failure(err: BackupError) -> anyhow::Error {
    let stage = err.stage();
    anyhow::Error::new(err).context(format!("backup failed while {}", stage))
}

/// One-line description of the cleanup result for the final log message.
pub fn describe_cleanup(outcome: &CleanupOutcome) -> String {
    match outcome {
        CleanupOutcome::Removed => "local archive deleted".to_string(),
        CleanupOutcome::Skipped => "local archive kept".to_string(),
        CleanupOutcome::Failed(reason) => format!("problem deleting local archive: {}", reason),
    }
}
