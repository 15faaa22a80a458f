#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use pruls_core::{BackupConfig, Clock, FixedClock, StorageBackend};
use pruls_services::{ArchiveError, Archiver};
use pruls_storage::{
    ByteStream, ObjectSink, ObjectStorage, ObjectStoreStorage, StorageError, StorageResult,
};
use tempfile::TempDir;

/// 2024-01-01 12:30:00
pub fn fixed_clock() -> Arc<dyn Clock> {
    let now = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    Arc::new(FixedClock(now))
}

pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Scratch layout for one run: credentials file, target dir, work dir.
pub struct Workspace {
    pub root: TempDir,
    pub config: BackupConfig,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let credentials = root.path().join("auth.json");
        fs::write(&credentials, b"{}").unwrap();
        let target = root.path().join("data");
        fs::create_dir(&target).unwrap();
        let work = root.path().join("work");
        fs::create_dir(&work).unwrap();

        let config = BackupConfig {
            credentials_path: credentials,
            app_name: "svc".to_string(),
            bucket_name: "backups".to_string(),
            file_prefix: String::new(),
            target_dir: target,
            work_dir: work,
            storage_backend: StorageBackend::Gcs,
            local_storage_path: None,
        };

        Workspace { root, config }
    }

    /// Fill the target dir with files whose sizes add up to `sizes`.
    pub fn with_files(self, sizes: &[usize]) -> Self {
        for (i, size) in sizes.iter().enumerate() {
            fs::write(
                self.config.target_dir.join(format!("file-{}.bin", i)),
                payload(*size),
            )
            .unwrap();
        }
        self
    }

    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.config.archive_path(name)
    }
}

/// Writes `size` bytes of fixed payload as the "archive".
#[derive(Clone)]
pub struct FixedSizeArchiver {
    pub size: usize,
    pub calls: Arc<AtomicUsize>,
}

impl FixedSizeArchiver {
    pub fn new(size: usize) -> Self {
        FixedSizeArchiver {
            size,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Archiver for FixedSizeArchiver {
    async fn create_archive(
        &self,
        _source_dir: &Path,
        output_path: &Path,
    ) -> Result<(), ArchiveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(output_path, payload(self.size))
            .await
            .map_err(|source| ArchiveError::Create {
                path: output_path.to_path_buf(),
                source,
            })
    }
}

pub struct FailingArchiver;

#[async_trait]
impl Archiver for FailingArchiver {
    async fn create_archive(
        &self,
        source_dir: &Path,
        _output_path: &Path,
    ) -> Result<(), ArchiveError> {
        Err(ArchiveError::Append {
            path: source_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
}

/// Faults that [`FaultyStorage`] can inject.
#[derive(Clone, Default)]
pub struct Faults {
    pub fail_write: bool,
    pub fail_finish: bool,
    pub fail_read: bool,
    /// Delete this local file when the object is opened for reading.
    pub remove_on_read: Option<PathBuf>,
}

/// In-memory storage that records traffic and injects faults.
#[derive(Clone)]
pub struct FaultyStorage {
    pub inner: ObjectStoreStorage,
    pub faults: Faults,
    pub chunk_sizes: Arc<Mutex<Vec<usize>>>,
    pub writers: Arc<AtomicUsize>,
    pub reads: Arc<AtomicUsize>,
}

impl FaultyStorage {
    pub fn new(faults: Faults) -> Self {
        FaultyStorage {
            inner: ObjectStoreStorage::in_memory("backups"),
            faults,
            chunk_sizes: Arc::new(Mutex::new(Vec::new())),
            writers: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunk_sizes.lock().unwrap().clone()
    }

    pub fn writers(&self) -> usize {
        self.writers.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for FaultyStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn writer(&self, name: &str) -> StorageResult<Box<dyn ObjectSink>> {
        self.writers.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.writer(name).await?;
        Ok(Box::new(FaultySink {
            inner,
            faults: self.faults.clone(),
            chunk_sizes: self.chunk_sizes.clone(),
        }))
    }

    async fn reader(&self, name: &str) -> StorageResult<ByteStream> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(ref path) = self.faults.remove_on_read {
            tokio::fs::remove_file(path).await?;
        }
        if self.faults.fail_read {
            return Err(StorageError::DownloadFailed("injected".to_string()));
        }
        self.inner.reader(name).await
    }
}

struct FaultySink {
    inner: Box<dyn ObjectSink>,
    faults: Faults,
    chunk_sizes: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl ObjectSink for FaultySink {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()> {
        if self.faults.fail_write {
            return Err(StorageError::UploadFailed("injected".to_string()));
        }
        self.chunk_sizes.lock().unwrap().push(chunk.len());
        self.inner.write(chunk).await
    }

    async fn finish(self: Box<Self>) -> StorageResult<()> {
        if self.faults.fail_finish {
            return Err(StorageError::FinalizeFailed("injected".to_string()));
        }
        self.inner.finish().await
    }
}
