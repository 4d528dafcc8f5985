//! Backup record naming grammar (§3, §6):
//! `<instance>-<version>-<YYYY-MM-DDTHH:MM:SS>.backup[.tar.gz]`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    pub instance: String,
    pub version: String,
    pub datetime: String,
    pub compressed: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BackupNameError {
    /// §8 boundary behavior: "Backup source lacking the three-field name →
    /// restore fails with `InvalidArg`".
    #[error("backup name {0:?} does not have the required `<instance>-<version>-<datetime>` fields")]
    MissingFields(String),
    #[error("backup name {0:?} is missing the `.backup` suffix")]
    MissingSuffix(String),
}

impl BackupName {
    /// Build a fresh backup record name for a just-created backup.
    pub fn new(instance: &str, version: &str, datetime: &str, compressed: bool) -> Self {
        BackupName {
            instance: instance.to_string(),
            version: version.to_string(),
            datetime: datetime.to_string(),
            compressed,
        }
    }

    /// Parse a backup base name. The version is "the third `-`-separated
    /// field" per §3 — since `instance` itself may contain `-`, the
    /// datetime (always well-formed RFC3339-without-timezone) is located
    /// from the right, and the version is whatever remains between the
    /// instance and the datetime, split on the *last* remaining `-`.
    pub fn parse(raw: &str) -> Result<Self, BackupNameError> {
        let (stem, compressed) = if let Some(s) = raw.strip_suffix(".backup.tar.gz") {
            (s, true)
        } else if let Some(s) = raw.strip_suffix(".backup") {
            (s, false)
        } else {
            return Err(BackupNameError::MissingSuffix(raw.to_string()));
        };

        let last_dash = stem.rfind('-').ok_or_else(|| BackupNameError::MissingFields(raw.to_string()))?;
        let (head, datetime) = stem.split_at(last_dash);
        let datetime = &datetime[1..];

        let second_last_dash = head.rfind('-').ok_or_else(|| BackupNameError::MissingFields(raw.to_string()))?;
        let (instance, version) = head.split_at(second_last_dash);
        let version = &version[1..];

        if instance.is_empty() || version.is_empty() || datetime.is_empty() {
            return Err(BackupNameError::MissingFields(raw.to_string()));
        }

        Ok(BackupName {
            instance: instance.to_string(),
            version: version.to_string(),
            datetime: datetime.to_string(),
            compressed,
        })
    }
}

impl fmt::Display for BackupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}.backup", self.instance, self.version, self.datetime)?;
        if self.compressed {
            write!(f, ".tar.gz")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "backup_name_tests.rs"]
mod tests;
