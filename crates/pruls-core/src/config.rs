//! Configuration module
//!
//! The backup is configured entirely through `PRULS_`-prefixed environment
//! variables, optionally seeded from a `.env` file by the binary:
//!
//! | variable                   | required | default                        |
//! |----------------------------|----------|--------------------------------|
//! | `PRULS_ACCOUNTKEYABSPATH`  | no       | `/etc/secret-volume/auth.json` |
//! | `PRULS_APPNAME`            | yes      |                                |
//! | `PRULS_BUCKETNAME`         | yes      |                                |
//! | `PRULS_FILEPREFIX`         | no       | empty                          |
//! | `PRULS_TARGETDIRABSPATH`   | yes      |                                |
//! | `PRULS_WORKDIR`            | no       | `.`                            |
//! | `PRULS_STORAGEBACKEND`     | no       | `gcs`                          |
//! | `PRULS_LOCALSTORAGEPATH`   | for `local` backend |                     |
//!
//! `PRULS_CREDENTIALSPATH` and `PRULS_TARGETDIR` are accepted as aliases. When
//! both spellings are set, the `*ABSPATH` variable wins.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::storage_types::StorageBackend;

pub const ENV_PREFIX: &str = "PRULS_";
pub const DEFAULT_CREDENTIALS_PATH: &str = "/etc/secret-volume/auth.json";
const DEFAULT_WORK_DIR: &str = ".";

/// Shape of the environment as envy sees it: keys are lowercased with the
/// prefix stripped.
#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(rename = "accountkeyabspath")]
    credentials_path: Option<PathBuf>,
    #[serde(rename = "credentialspath")]
    credentials_path_alias: Option<PathBuf>,
    #[serde(rename = "appname")]
    app_name: String,
    #[serde(rename = "bucketname")]
    bucket_name: String,
    #[serde(rename = "fileprefix", default)]
    file_prefix: String,
    #[serde(rename = "targetdirabspath")]
    target_dir: Option<PathBuf>,
    #[serde(rename = "targetdir")]
    target_dir_alias: Option<PathBuf>,
    #[serde(rename = "workdir")]
    work_dir: Option<PathBuf>,
    #[serde(rename = "storagebackend")]
    storage_backend: Option<String>,
    #[serde(rename = "localstoragepath")]
    local_storage_path: Option<PathBuf>,
}

/// Immutable configuration for one backup run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackupConfig {
    /// Storage-access credential (service-account JSON for GCS).
    pub credentials_path: PathBuf,
    pub app_name: String,
    pub bucket_name: String,
    pub file_prefix: String,
    /// Directory being backed up.
    pub target_dir: PathBuf,
    /// Directory the local archive is written into.
    pub work_dir: PathBuf,
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<PathBuf>,
}

impl BackupConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw: EnvConfig = envy::prefixed(ENV_PREFIX).from_env()?;
        Self::from_raw(raw)
    }

    /// Load from an explicit set of `(KEY, value)` pairs, using the same
    /// prefixed keys as the environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: EnvConfig = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: EnvConfig) -> Result<Self, ConfigError> {
        let storage_backend = match raw.storage_backend.as_deref() {
            None | Some("") => StorageBackend::default(),
            Some(value) => value.parse()?,
        };

        let credentials_path = pick(
            "accountkeyabspath",
            raw.credentials_path,
            raw.credentials_path_alias,
        )
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        let target_dir = pick("targetdirabspath", raw.target_dir, raw.target_dir_alias)
            .ok_or(ConfigError::Missing("targetdirabspath"))?;

        let config = BackupConfig {
            credentials_path,
            app_name: raw.app_name,
            bucket_name: raw.bucket_name,
            file_prefix: raw.file_prefix,
            target_dir,
            work_dir: raw
                .work_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR)),
            storage_backend,
            local_storage_path: raw.local_storage_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the options themselves. Filesystem checks live in
    /// [`crate::validation::validate_config`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Empty("appname"));
        }
        if self.bucket_name.trim().is_empty() {
            return Err(ConfigError::Empty("bucketname"));
        }
        if self.target_dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty("targetdirabspath"));
        }
        check_key_segment("appname", &self.app_name)?;
        check_key_segment("fileprefix", &self.file_prefix)?;
        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(ConfigError::Invalid {
                option: "localstoragepath",
                reason: "required when storagebackend=local".to_string(),
            });
        }
        Ok(())
    }

    /// Path of the local archive for a generated name.
    pub fn archive_path(&self, archive_name: &str) -> PathBuf {
        self.work_dir.join(archive_name)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

/// Prefer the canonical variable over its alias.
fn pick(
    option: &'static str,
    canonical: Option<PathBuf>,
    alias: Option<PathBuf>,
) -> Option<PathBuf> {
    match (canonical, alias) {
        (Some(canonical), Some(alias)) => {
            if canonical != alias {
                tracing::warn!(
                    option,
                    used = %canonical.display(),
                    ignored = %alias.display(),
                    "Both an option and its alias are set, using the option"
                );
            }
            Some(canonical)
        }
        (canonical, alias) => canonical.or(alias),
    }
}

/// Names end up inside the object key and must stay a single path segment.
fn check_key_segment(option: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.contains('/') || value.contains('\\') || value.contains("..") {
        return Err(ConfigError::Invalid {
            option,
            reason: format!("{:?} must not contain '/', '\\' or '..'", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_vars_applies_defaults() {
        let config = BackupConfig::from_vars(vars(&[
            ("PRULS_APPNAME", "svc"),
            ("PRULS_BUCKETNAME", "backups"),
            ("PRULS_TARGETDIRABSPATH", "/srv/data"),
        ]))
        .unwrap();

        assert_eq!(config.app_name, "svc");
        assert_eq!(config.bucket_name, "backups");
        assert_eq!(config.file_prefix, "");
        assert_eq!(config.target_dir, PathBuf::from("/srv/data"));
        assert_eq!(
            config.credentials_path,
            PathBuf::from(DEFAULT_CREDENTIALS_PATH)
        );
        assert_eq!(config.work_dir, PathBuf::from("."));
        assert_eq!(config.storage_backend, StorageBackend::Gcs);
    }

    #[test]
    fn test_from_vars_reads_all_options() {
        let config = BackupConfig::from_vars(vars(&[
            ("PRULS_ACCOUNTKEYABSPATH", "/keys/auth.json"),
            ("PRULS_APPNAME", "svc"),
            ("PRULS_BUCKETNAME", "backups"),
            ("PRULS_FILEPREFIX", "nightly"),
            ("PRULS_TARGETDIRABSPATH", "/srv/data"),
            ("PRULS_WORKDIR", "/tmp"),
            ("PRULS_STORAGEBACKEND", "LOCAL"),
            ("PRULS_LOCALSTORAGEPATH", "/var/backups"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.credentials_path, PathBuf::from("/keys/auth.json"));
        assert_eq!(config.file_prefix, "nightly");
        assert_eq!(config.work_dir, PathBuf::from("/tmp"));
        assert_eq!(config.storage_backend, StorageBackend::Local);
        assert_eq!(
            config.local_storage_path,
            Some(PathBuf::from("/var/backups"))
        );
        assert_eq!(
            config.archive_path("a.tar.gz"),
            PathBuf::from("/tmp/a.tar.gz")
        );
    }

    #[test]
    fn test_aliases_are_accepted() {
        let config = BackupConfig::from_vars(vars(&[
            ("PRULS_CREDENTIALSPATH", "/keys/auth.json"),
            ("PRULS_APPNAME", "svc"),
            ("PRULS_BUCKETNAME", "backups"),
            ("PRULS_TARGETDIR", "/srv/data"),
        ]))
        .unwrap();

        assert_eq!(config.credentials_path, PathBuf::from("/keys/auth.json"));
        assert_eq!(config.target_dir, PathBuf::from("/srv/data"));
    }

    #[test]
    fn test_canonical_name_wins_over_alias() {
        let config = BackupConfig::from_vars(vars(&[
            ("PRULS_ACCOUNTKEYABSPATH", "/keys/auth.json"),
            ("PRULS_CREDENTIALSPATH", "/old/auth.json"),
            ("PRULS_APPNAME", "svc"),
            ("PRULS_BUCKETNAME", "backups"),
            ("PRULS_TARGETDIRABSPATH", "/srv/data"),
            ("PRULS_TARGETDIR", "/srv/old"),
        ]))
        .unwrap();

        assert_eq!(config.credentials_path, PathBuf::from("/keys/auth.json"));
        assert_eq!(config.target_dir, PathBuf::from("/srv/data"));
    }

    #[test]
    fn test_missing_target_dir() {
        let result = BackupConfig::from_vars(vars(&[
            ("PRULS_APPNAME", "svc"),
            ("PRULS_BUCKETNAME", "backups"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Missing("targetdirabspath"))
        ));
    }

    #[test]
    fn test_names_must_be_single_key_segment() {
        for (key, value, option) in [
            ("PRULS_APPNAME", "svc/../etc", "appname"),
            ("PRULS_APPNAME", "..", "appname"),
            ("PRULS_FILEPREFIX", "nightly/daily", "fileprefix"),
            ("PRULS_FILEPREFIX", "a\\b", "fileprefix"),
        ] {
            let mut pairs = vec![
                ("PRULS_APPNAME", "svc"),
                ("PRULS_BUCKETNAME", "backups"),
                ("PRULS_TARGETDIRABSPATH", "/srv/data"),
            ];
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));

            let result = BackupConfig::from_vars(vars(&pairs));
            assert!(
                matches!(result, Err(ConfigError::Invalid { option: o, .. }) if o == option),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_missing_required_option() {
        let result = BackupConfig::from_vars(vars(&[
            ("PRULS_APPNAME", "svc"),
            ("PRULS_TARGETDIRABSPATH", "/srv/data"),
        ]));
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }

    #[test]
    fn test_empty_required_option() {
        let result = BackupConfig::from_vars(vars(&[
            ("PRULS_APPNAME", ""),
            ("PRULS_BUCKETNAME", "backups"),
            ("PRULS_TARGETDIRABSPATH", "/srv/data"),
        ]));
        assert!(matches!(result, Err(ConfigError::Empty("appname"))));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = BackupConfig::from_vars(vars(&[
            ("PRULS_APPNAME", "svc"),
            ("PRULS_BUCKETNAME", "backups"),
            ("PRULS_TARGETDIRABSPATH", "/srv/data"),
            ("PRULS_STORAGEBACKEND", "ftp"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_local_backend_requires_path() {
        let result = BackupConfig::from_vars(vars(&[
            ("PRULS_APPNAME", "svc"),
            ("PRULS_BUCKETNAME", "backups"),
            ("PRULS_TARGETDIRABSPATH", "/srv/data"),
            ("PRULS_STORAGEBACKEND", "local"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                option: "localstoragepath",
                ..
            })
        ));
    }
}
