//! Archive naming
//!
//! Archive names have the shape
//! `YYYY_MM_DD_HHMM_SS_[prefix_]appName_backup.tar.gz`. The leading timestamp
//! makes names sort chronologically and keeps runs one second apart from
//! colliding. Two runs in the same second with the same prefix and app name
//! produce the same name.

use chrono::NaiveDateTime;

/// Separators and fixed segments used to build archive names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    pub separator: String,
    pub suffix: String,
    pub extension: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        NamingRules {
            separator: "_".to_string(),
            suffix: "backup".to_string(),
            extension: ".tar.gz".to_string(),
        }
    }
}

impl NamingRules {
    /// chrono format string for the timestamp segment, e.g. `%Y_%m_%d_%H%M_%S`.
    fn timestamp_format(&self) -> String {
        let sep = &self.separator;
        format!("%Y{sep}%m{sep}%d{sep}%H%M{sep}%S")
    }
}

/// Build the archive name for `now`.
///
/// The prefix segment and its separator are left out entirely when `prefix`
/// is empty.
pub fn archive_filename(
    now: NaiveDateTime,
    prefix: &str,
    app_name: &str,
    rules: &NamingRules,
) -> String {
    let sep = &rules.separator;
    let mut name = now.format(&rules.timestamp_format()).to_string();
    name.push_str(sep);
    if !prefix.is_empty() {
        name.push_str(prefix);
        name.push_str(sep);
    }
    name.push_str(app_name);
    name.push_str(sep);
    name.push_str(&rules.suffix);
    name.push_str(&rules.extension);
    name
}
