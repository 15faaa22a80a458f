//! Credential file formats for backends that need parsing on our side.
//!
//! GCS reads its service-account key file directly, so only S3 is handled here.

use std::path::Path;

use serde::Deserialize;

use crate::traits::{StorageError, StorageResult};

/// Contents of the credentials file when the S3 backend is selected.
///
/// ```json
/// { "access_key_id": "...", "secret_access_key": "...", "region": "eu-west-1" }
/// ```
#[derive(Clone, Deserialize)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, etc.)
    #[serde(default)]
    pub endpoint: Option<String>,
}

// Keep the secret out of logs.
impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl S3Credentials {
    pub async fn from_file(path: &Path) -> StorageResult<Self> {
        let raw = tokio::fs::read(path).await?;
        serde_json::from_slice(&raw).map_err(|e| {
            StorageError::ConfigError(format!(
                "Invalid S3 credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }
}
