use std::path::Path;

/// What happened to the local archive at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Removed,
    /// Removal was turned off for this run.
    Skipped,
    Failed(String),
}

impl CleanupOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, CleanupOutcome::Removed)
    }
}

/// Delete the local archive. Never fails: a problem is logged as a warning and
/// returned as [`CleanupOutcome::Failed`].
pub async fn remove_local_archive(path: &Path) -> CleanupOutcome {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Local archive deleted");
            CleanupOutcome::Removed
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Problem deleting local archive"
            );
            CleanupOutcome::Failed(e.to_string())
        }
    }
}
