use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pruls_core::{archive_filename, validate_config, BackupConfig, Clock, NamingRules, SystemClock};
use pruls_storage::ObjectStorage;

use super::cleanup::{remove_local_archive, CleanupOutcome};
use super::error::{BackupError, UploadError};
use super::uploader::{upload_chunks, UploadStats};
use super::verifier::verify_upload;
use super::{ArchiveDescriptor, Stage};
use crate::archive::Archiver;

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub archive_name: String,
    pub bucket: String,
    pub bytes_uploaded: u64,
    pub chunks: u64,
    pub cleanup: CleanupOutcome,
    pub duration: Duration,
}

/// Runs one backup from validation to cleanup.
///
/// Stages run strictly one after another. The pipeline never exits the
/// process; callers decide what to do with a [`BackupError`].
pub struct BackupPipeline {
    config: BackupConfig,
    storage: Arc<dyn ObjectStorage>,
    archiver: Arc<dyn Archiver>,
    clock: Arc<dyn Clock>,
    naming: NamingRules,
    keep_local: bool,
}

impl BackupPipeline {
    pub fn new(
        config: BackupConfig,
        storage: Arc<dyn ObjectStorage>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        BackupPipeline {
            config,
            storage,
            archiver,
            clock: Arc::new(SystemClock),
            naming: NamingRules::default(),
            keep_local: false,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_naming(mut self, naming: NamingRules) -> Self {
        self.naming = naming;
        self
    }

    /// Leave the local archive in place after a successful upload.
    pub fn keep_local(mut self, keep: bool) -> Self {
        self.keep_local = keep;
        self
    }

    pub async fn run(&self) -> Result<BackupReport, BackupError> {
        let started = Instant::now();

        enter(Stage::Validating);
        validate_config(&self.config)?;

        enter(Stage::Naming);
        let archive = self.describe_archive();
        tracing::info!(
            archive = %archive.name,
            path = %archive.path.display(),
            "Archive name generated"
        );

        enter(Stage::Archiving);
        self.archiver
            .create_archive(&self.config.target_dir, &archive.path)
            .await?;

        let stats = self.upload(&archive).await?;
        tracing::info!(
            archive = %archive.name,
            bucket = %self.storage.bucket(),
            size_bytes = stats.bytes,
            chunks = stats.chunks,
            "Chunks written to bucket"
        );

        enter(Stage::Verifying);
        verify_upload(self.storage.as_ref(), &archive.name)
            .await
            .map_err(|source| BackupError::Verify {
                bucket: self.storage.bucket().to_string(),
                name: archive.name.clone(),
                source,
            })?;

        enter(Stage::CleaningUp);
        let cleanup = if self.keep_local {
            tracing::info!(path = %archive.path.display(), "Keeping local archive");
            CleanupOutcome::Skipped
        } else {
            remove_local_archive(&archive.path).await
        };

        enter(Stage::Done);
        Ok(BackupReport {
            archive_name: archive.name,
            bucket: self.storage.bucket().to_string(),
            bytes_uploaded: stats.bytes,
            chunks: stats.chunks,
            cleanup,
            duration: started.elapsed(),
        })
    }

    fn describe_archive(&self) -> ArchiveDescriptor {
        let name = archive_filename(
            self.clock.now(),
            &self.config.file_prefix,
            &self.config.app_name,
            &self.naming,
        );
        let path = self.config.archive_path(&name);
        ArchiveDescriptor { name, path }
    }

    /// Opening and Uploading. The local file handle lives only inside this
    /// function, so it is closed on every return path.
    async fn upload(&self, archive: &ArchiveDescriptor) -> Result<UploadStats, BackupError> {
        enter(Stage::Opening);
        let mut file = open_archive(&archive.path).await?;

        enter(Stage::Uploading);
        let upload_err = |source: UploadError| BackupError::Upload {
            name: archive.name.clone(),
            source,
        };

        let sink = self
            .storage
            .writer(&archive.name)
            .await
            .map_err(|e| upload_err(UploadError::Open(e)))?;

        upload_chunks(&mut file, sink).await.map_err(upload_err)
    }
}

async fn open_archive(path: &Path) -> Result<tokio::fs::File, BackupError> {
    tokio::fs::File::open(path)
        .await
        .map_err(|source| BackupError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn enter(stage: Stage) {
    tracing::info!(stage = %stage, "Backup stage");
}
