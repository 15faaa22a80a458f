//! Pruls Core Library
//!
//! This crate provides the configuration, naming rules, validation and error
//! types shared by every pruls component.

pub mod clock;
pub mod config;
pub mod error;
pub mod naming;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BackupConfig, DEFAULT_CREDENTIALS_PATH, ENV_PREFIX};
pub use error::{ConfigError, ValidationError};
pub use naming::{archive_filename, NamingRules};
pub use storage_types::StorageBackend;
pub use validation::validate_config;
