use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, WriteMultipart};

use crate::credentials::S3Credentials;
use crate::traits::{ByteStream, ObjectSink, ObjectStorage, StorageError, StorageResult};

/// Parts buffered by the multipart writer before `write` waits for uploads
/// to drain.
const MAX_CONCURRENT_PARTS: usize = 4;

/// Object storage implementation over the `object_store` crate.
#[derive(Clone)]
pub struct ObjectStoreStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStoreStorage {
    /// Wrap an already-configured store.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        ObjectStoreStorage {
            store,
            bucket: bucket.into(),
        }
    }

    /// Google Cloud Storage, authenticated with a service-account key file.
    pub fn gcs(bucket: &str, service_account_path: &FsPath) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::new()
            .with_service_account_path(service_account_path.to_string_lossy())
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build GCS store: {}", e)))?;

        Ok(Self::new(Arc::new(store), bucket))
    }

    /// Amazon S3 or an S3-compatible provider.
    ///
    /// Settings missing from `credentials` fall back to the usual `AWS_*`
    /// environment variables.
    pub fn s3(bucket: &str, credentials: &S3Credentials) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_access_key_id(&credentials.access_key_id)
            .with_secret_access_key(&credentials.secret_access_key);

        if let Some(ref region) = credentials.region {
            builder = builder.with_region(region);
        }
        if let Some(ref endpoint) = credentials.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build S3 store: {}", e)))?;

        Ok(Self::new(Arc::new(store), bucket))
    }

    /// A directory on the local filesystem. The directory must exist.
    pub fn local(bucket: &str, root: &FsPath) -> StorageResult<Self> {
        let store = LocalFileSystem::new_with_prefix(root).map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to open local storage at {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self::new(Arc::new(store), bucket))
    }

    /// Volatile store, mainly for tests.
    pub fn in_memory(bucket: &str) -> Self {
        Self::new(Arc::new(InMemory::new()), bucket)
    }

    fn object_path(name: &str) -> StorageResult<Path> {
        if name.is_empty() || name.contains("..") || name.starts_with('/') {
            return Err(StorageError::InvalidKey(name.to_string()));
        }
        Path::parse(name).map_err(|e| StorageError::InvalidKey(format!("{}: {}", name, e)))
    }
}

#[async_trait]
impl ObjectStorage for ObjectStoreStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn writer(&self, name: &str) -> StorageResult<Box<dyn ObjectSink>> {
        let location = Self::object_path(name)?;

        let upload = self.store.put_multipart(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %name,
                "Failed to start multipart upload"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::debug!(bucket = %self.bucket, key = %name, "Multipart upload started");

        Ok(Box::new(ObjectStoreSink {
            upload: WriteMultipart::new(upload),
            bucket: self.bucket.clone(),
            key: name.to_string(),
            bytes_written: 0,
            started: Instant::now(),
        }))
    }

    async fn reader(&self, name: &str) -> StorageResult<ByteStream> {
        let location = Self::object_path(name)?;

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(name.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bucket = self.bucket.clone();
        let key = name.to_string();
        let stream = result.into_stream().map(move |res| {
            res.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Object stream read error"
                );
                StorageError::DownloadFailed(e.to_string())
            })
        });

        Ok(Box::pin(stream))
    }
}

/// Multipart writer for one object.
struct ObjectStoreSink {
    upload: WriteMultipart,
    bucket: String,
    key: String,
    bytes_written: u64,
    started: Instant,
}

#[async_trait]
impl ObjectSink for ObjectStoreSink {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()> {
        self.upload
            .wait_for_capacity(MAX_CONCURRENT_PARTS)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("{}/{}: {}", self.bucket, self.key, e))
            })?;
        self.upload.write(chunk);
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    async fn finish(self: Box<Self>) -> StorageResult<()> {
        let ObjectStoreSink {
            upload,
            bucket,
            key,
            bytes_written,
            started,
        } = *self;

        upload.finish().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = bytes_written,
                "Multipart upload failed to complete"
            );
            StorageError::FinalizeFailed(format!("{}/{}: {}", bucket, key, e))
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = bytes_written,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Object upload completed"
        );

        Ok(())
    }
}
