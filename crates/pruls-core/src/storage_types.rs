use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ConfigError;

/// Storage backend types
///
/// Selects which object storage provider receives the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Gcs,
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcs" | "google" => Ok(StorageBackend::Gcs),
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(ConfigError::Invalid {
                option: "storagebackend",
                reason: format!("unknown storage backend: {}", s),
            }),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Gcs => write!(f, "gcs"),
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}
