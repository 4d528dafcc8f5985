//! Process-wide state, constructed once and threaded through every
//! component (§9 "Process-wide state" design note) instead of a
//! `KGSM_ROOT` + `config.ini` global.

use crate::error::EngineError;
use kgsm_config::{document::Value, settings, ConfigStore};
use kgsm_core::clock::{Clock, SystemClock};
use std::path::{Path, PathBuf};

/// Everything every other `kgsm-engine` component needs: where KGSM_ROOT
/// is, the process-wide config store, a clock, and the privilege-elevation
/// prefix for host-mutating adapters.
#[derive(Clone)]
pub struct Context<C: Clock = SystemClock> {
    pub root: PathBuf,
    pub clock: C,
    pub config_store: ConfigStore,
    /// e.g. `Some("sudo -E".into())` when not already running as root.
    pub elevate_prefix: Option<String>,
    pub kgsm_version: String,
}

impl Context<SystemClock> {
    /// Resolve `KGSM_ROOT` once: the environment variable if set, else
    /// `$XDG_DATA_HOME/kgsm` (falling back to `~/.local/share/kgsm`).
    pub fn load() -> Result<Self, EngineError> {
        let root = match std::env::var_os("KGSM_ROOT") {
            Some(v) => PathBuf::from(v),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("kgsm"),
        };
        Ok(Context::with_root(root))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Context {
            root,
            clock: SystemClock,
            config_store: ConfigStore::new(),
            elevate_prefix: if nix::unistd::Uid::effective().is_root() {
                None
            } else {
                Some("sudo -E".to_string())
            },
            kgsm_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl<C: Clock> Context<C> {
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.ini")
    }

    pub fn blueprints_default_dir(&self) -> PathBuf {
        self.root.join("blueprints").join("default")
    }

    pub fn blueprints_custom_dir(&self) -> PathBuf {
        self.root.join("blueprints").join("custom")
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.root.join("instances")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn overrides_dir(&self) -> PathBuf {
        self.root.join("overrides")
    }

    fn setting_raw(&self, key: &str) -> String {
        match self.config_store.get(&self.config_path(), key) {
            Ok(Some(Value::Scalar(s))) => s,
            _ => settings::find(key).map(|s| s.default.to_string()).unwrap_or_default(),
        }
    }

    pub fn setting_bool(&self, key: &str) -> bool {
        self.setting_raw(key) == "true"
    }

    pub fn setting_u64(&self, key: &str) -> u64 {
        self.setting_raw(key).parse().unwrap_or(0)
    }

    pub fn setting_string(&self, key: &str) -> String {
        self.setting_raw(key)
    }

    pub fn instance_suffix_length(&self) -> usize {
        self.setting_u64("instance_suffix_length") as usize
    }

    pub fn systemd_files_dir(&self) -> PathBuf {
        let s = self.setting_string("systemd_files_dir");
        if s.is_empty() {
            self.root.join("systemd")
        } else {
            is_absolute_or_join(&self.root, &s)
        }
    }

    pub fn firewall_rules_dir(&self) -> PathBuf {
        let s = self.setting_string("firewall_rules_dir");
        if s.is_empty() {
            self.root.join("firewall")
        } else {
            is_absolute_or_join(&self.root, &s)
        }
    }

    pub fn command_shortcuts_dir(&self) -> PathBuf {
        let s = self.setting_string("command_shortcuts_directory");
        if s.is_empty() {
            PathBuf::from("/usr/local/bin")
        } else {
            is_absolute_or_join(&self.root, &s)
        }
    }

    pub fn event_socket_path(&self) -> PathBuf {
        self.root.join(self.setting_string("event_socket_filename"))
    }

    pub fn watcher_timeout_seconds(&self) -> u64 {
        self.setting_u64("watcher_timeout_seconds")
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Context<kgsm_core::clock::FakeClock> {
    /// Test constructor: an isolated root (typically a tempdir) with a
    /// deterministic clock and no privilege elevation.
    pub fn for_test(root: PathBuf) -> Self {
        Context {
            root,
            clock: kgsm_core::clock::FakeClock::default(),
            config_store: ConfigStore::new(),
            elevate_prefix: None,
            kgsm_version: "test".to_string(),
        }
    }
}

pub fn is_absolute_or_join(root: &Path, candidate: &str) -> PathBuf {
    let p = Path::new(candidate);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
