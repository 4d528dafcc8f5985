//! The event envelope broadcast over every transport (§3, §4.6, §6).
//!
//! The envelope's `EventType` and `Data` are two independent top-level
//! fields rather than a tagged union — `Data`'s *shape* still depends on
//! `EventType` (§6's event table), so construction goes through
//! [`Envelope::new`], which pairs them and panics-never: a mismatched pair
//! is a programmer error caught by the `matches_kind` debug assertion, not
//! a runtime failure path.

use serde::{Deserialize, Serialize};

/// One entry per row of the §6 event table. Serializes as the literal
/// event name used on the wire (socket JSON and webhook JSON bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    InstanceCreated,
    InstanceDirectoriesCreated,
    InstanceDirectoriesRemoved,
    InstanceFilesCreated,
    InstanceFilesRemoved,
    InstanceDownloadStarted,
    InstanceDownloadFinished,
    InstanceDownloaded,
    InstanceDeployStarted,
    InstanceDeployFinished,
    InstanceDeployed,
    InstanceUpdateStarted,
    InstanceUpdateFinished,
    InstanceUpdated,
    InstanceStarted,
    InstanceStopped,
    InstanceRemoved,
    InstanceUninstallStarted,
    InstanceUninstallFinished,
    InstanceUninstalled,
    InstanceInstallationStarted,
    InstanceInstallationFinished,
    InstanceInstalled,
    InstanceVersionUpdated,
    InstanceBackupCreated,
    InstanceBackupRestored,
    InstanceReady,
}

impl EventType {
    /// Whether this event's payload additionally carries `Blueprint`, per
    /// the §6 table's "(last three also include Blueprint)" note plus
    /// `instance_created`.
    pub fn carries_blueprint(self) -> bool {
        matches!(
            self,
            EventType::InstanceCreated
                | EventType::InstanceInstallationStarted
                | EventType::InstanceInstallationFinished
                | EventType::InstanceInstalled
        )
    }
}

/// The `Data` payload shapes from the §6 event table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventData {
    Instance {
        #[serde(rename = "InstanceName")]
        instance_name: String,
        #[serde(rename = "Blueprint", skip_serializing_if = "Option::is_none")]
        blueprint: Option<String>,
    },
    VersionUpdated {
        #[serde(rename = "InstanceName")]
        instance_name: String,
        #[serde(rename = "OldVersion")]
        old_version: String,
        #[serde(rename = "NewVersion")]
        new_version: String,
    },
    Backup {
        #[serde(rename = "InstanceName")]
        instance_name: String,
        #[serde(rename = "Source")]
        source: String,
        #[serde(rename = "Version")]
        version: String,
    },
}

impl EventData {
    fn matches_kind(&self, kind: EventType) -> bool {
        match self {
            EventData::Instance { blueprint, .. } => {
                blueprint.is_some() == kind.carries_blueprint()
            }
            EventData::VersionUpdated { .. } => kind == EventType::InstanceVersionUpdated,
            EventData::Backup { .. } => {
                matches!(
                    kind,
                    EventType::InstanceBackupCreated | EventType::InstanceBackupRestored
                )
            }
        }
    }
}

/// Canonical envelope per §3: `{EventType, Data, Timestamp, Hostname,
/// KGSMVersion}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "EventType")]
    pub event_type: EventType,
    #[serde(rename = "Data")]
    pub data: EventData,
    /// RFC3339 UTC, produced via [`crate::time_fmt::epoch_ms_to_rfc3339`].
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(rename = "KGSMVersion")]
    pub kgsm_version: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("event data shape {0:?} does not match event type {1:?}")]
pub struct MismatchedEventData(EventData, EventType);

impl Envelope {
    pub fn new(
        event_type: EventType,
        data: EventData,
        timestamp: String,
        hostname: String,
        kgsm_version: String,
    ) -> Result<Self, MismatchedEventData> {
        if !data.matches_kind(event_type) {
            return Err(MismatchedEventData(data, event_type));
        }
        Ok(Envelope {
            event_type,
            data,
            timestamp,
            hostname,
            kgsm_version,
        })
    }

    /// Serialize as newline-delimited JSON for the socket transport (§6).
    pub fn to_ndjson_line(&self) -> Result<String, serde_json::Error> {
        let mut s = serde_json::to_string(self)?;
        s.push('\n');
        Ok(s)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
