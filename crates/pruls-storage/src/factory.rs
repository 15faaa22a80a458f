use std::sync::Arc;

use pruls_core::BackupConfig;

use crate::credentials::S3Credentials;
use crate::object::ObjectStoreStorage;
use crate::{ObjectStorage, StorageBackend, StorageError, StorageResult};

/// Create the storage backend selected by configuration
pub async fn create_storage(config: &BackupConfig) -> StorageResult<Arc<dyn ObjectStorage>> {
    let bucket = config.bucket_name.as_str();

    let storage = match config.storage_backend {
        StorageBackend::Gcs => ObjectStoreStorage::gcs(bucket, &config.credentials_path)?,

        StorageBackend::S3 => {
            let credentials = S3Credentials::from_file(&config.credentials_path).await?;
            ObjectStoreStorage::s3(bucket, &credentials)?
        }

        StorageBackend::Local => {
            let base_path = config.local_storage_path.as_ref().ok_or_else(|| {
                StorageError::ConfigError("PRULS_LOCALSTORAGEPATH not configured".to_string())
            })?;
            let root = base_path.join(bucket);
            tokio::fs::create_dir_all(&root).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    root.display(),
                    e
                ))
            })?;
            ObjectStoreStorage::local(bucket, &root)?
        }
    };

    tracing::info!(
        backend = %config.storage_backend,
        bucket = %bucket,
        "Object storage configured"
    );

    Ok(Arc::new(storage))
}
