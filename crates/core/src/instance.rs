//! The instance data model (§3). Like [`crate::blueprint::Blueprint`], this
//! is shape only — reading/writing the on-disk config document is
//! `kgsm-config`'s job, and the registry operations of §4.8 live in
//! `kgsm-engine` so that crate (not this one) depends on `kgsm-config`.

use crate::blueprint::Runtime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleManager {
    Standalone,
    Systemd,
}

/// The canonical subdirectories every instance's `working_dir` contains
/// after creation (§3 invariant, §6 persisted state layout).
pub const CANONICAL_SUBDIRS: [&str; 5] = ["backups", "install", "saves", "temp", "logs"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationState {
    pub enabled: bool,
    pub artifact_path: Option<PathBuf>,
}

impl IntegrationState {
    pub fn disabled() -> Self {
        IntegrationState {
            enabled: false,
            artifact_path: None,
        }
    }

    /// §3 invariant: "For each enabled integration flag there exists a
    /// corresponding artifact path; for each disabled flag the path is
    /// empty".
    pub fn is_consistent(&self) -> bool {
        self.enabled == self.artifact_path.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    // Identity
    pub name: String,
    pub blueprint_file: PathBuf,

    // Location
    pub working_dir: PathBuf,
    pub version_file: PathBuf,
    pub config_file: PathBuf,
    pub management_file: PathBuf,

    // Runtime selection
    pub runtime: Runtime,
    pub lifecycle_manager: LifecycleManager,
    pub executable_file: String,
    pub executable_arguments: String,
    pub launch_dir: PathBuf,
    pub ports: String,
    pub stop_command: String,
    pub save_command: String,
    pub socket_file: PathBuf,
    pub pid_file: PathBuf,
    pub tail_pid_file: PathBuf,

    // Integration flags
    pub systemd: IntegrationState,
    pub systemd_socket_file: Option<PathBuf>,
    pub firewall: IntegrationState,
    pub command_shortcut: IntegrationState,
    pub port_forwarding: IntegrationState,
    pub upnp_ports: Vec<String>,

    // Operations tuning
    pub save_command_timeout_seconds: u64,
    pub stop_command_timeout_seconds: u64,
    pub compress_backups: bool,
    pub auto_update: bool,

    // Provenance
    pub install_datetime: String,
    pub installed_version: String,
}

impl Instance {
    pub fn backups_dir(&self) -> PathBuf {
        self.working_dir.join("backups")
    }

    pub fn install_dir(&self) -> PathBuf {
        self.working_dir.join("install")
    }

    pub fn saves_dir(&self) -> PathBuf {
        self.working_dir.join("saves")
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.working_dir.join("temp")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.working_dir.join("logs")
    }

    pub fn canonical_subdir_paths(&self) -> Vec<PathBuf> {
        CANONICAL_SUBDIRS
            .iter()
            .map(|d| self.working_dir.join(d))
            .collect()
    }

    /// §3 invariant: `lifecycle_manager == systemd` iff `enable_systemd ==
    /// true` iff both systemd artifact paths are set.
    pub fn systemd_invariant_holds(&self) -> bool {
        let is_systemd = self.lifecycle_manager == LifecycleManager::Systemd;
        is_systemd == self.systemd.enabled
            && self.systemd.enabled == self.systemd_socket_file.is_some()
            && self.systemd.is_consistent()
    }

    /// §3 invariant: integration consistency across all four flags.
    pub fn integration_flags_consistent(&self) -> bool {
        self.systemd.is_consistent()
            && self.firewall.is_consistent()
            && self.command_shortcut.is_consistent()
            && self.port_forwarding.is_consistent()
    }

    /// Whether `working_dir` contains exactly the six canonical subdirs,
    /// given the set actually present on disk. Pure predicate — the
    /// directory listing itself is the caller's I/O.
    pub fn has_canonical_layout(existing: &[PathBuf], expected_root: &Path) -> bool {
        let expected: Vec<PathBuf> = CANONICAL_SUBDIRS
            .iter()
            .map(|d| expected_root.join(d))
            .collect();
        let mut existing_sorted = existing.to_vec();
        existing_sorted.sort();
        let mut expected_sorted = expected;
        expected_sorted.sort();
        existing_sorted == expected_sorted
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
