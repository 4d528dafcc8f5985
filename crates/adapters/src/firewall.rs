//! Firewall adapter for the UFW integration (§4.4): translates the
//! blueprint's UFW-style port string into a rule file named `kgsm-<instance>`
//! and a matching named allow-rule.

use crate::error::AdapterError;
use crate::subprocess::{self, PROBE_TIMEOUT};
use async_trait::async_trait;
use kgsm_core::port_spec;
use std::path::Path;
use tokio::process::Command;

#[async_trait]
pub trait FirewallAdapter: Clone + Send + Sync + 'static {
    /// Writes `rule_file` and enables the allow-rule for `rule_name`.
    /// Refuses (collision) if `rule_file` already exists.
    async fn enable(&self, rule_file: &Path, rule_name: &str, ufw_spec: &str) -> Result<(), AdapterError>;

    /// Deletes the allow-rule (tolerant of missing) and removes `rule_file`
    /// (tolerant of missing).
    async fn disable(&self, rule_file: &Path, rule_name: &str) -> Result<(), AdapterError>;

    async fn is_enabled(&self, rule_file: &Path) -> Result<bool, AdapterError>;
}

#[derive(Debug, Clone, Default)]
pub struct RealFirewallAdapter {
    pub elevate_prefix: Option<String>,
}

impl RealFirewallAdapter {
    pub fn new(elevate_prefix: Option<String>) -> Self {
        RealFirewallAdapter { elevate_prefix }
    }

    fn ufw_command(&self, args: &[String]) -> Command {
        match &self.elevate_prefix {
            Some(prefix) => {
                let mut parts = prefix.split_whitespace();
                let program = parts.next().unwrap_or("sudo");
                let mut cmd = Command::new(program);
                cmd.args(parts);
                cmd.arg("ufw");
                cmd.args(args);
                cmd
            }
            None => {
                let mut cmd = Command::new("ufw");
                cmd.args(args);
                cmd
            }
        }
    }

    fn rule_file_body(rule_name: &str, ranges: &[port_spec::PortRange]) -> String {
        let mut body = format!("# kgsm firewall rule: {rule_name}\n");
        for range in ranges {
            body.push_str(&format!("{range}\n"));
        }
        body
    }
}

#[async_trait]
impl FirewallAdapter for RealFirewallAdapter {
    async fn enable(&self, rule_file: &Path, rule_name: &str, ufw_spec: &str) -> Result<(), AdapterError> {
        if rule_file.exists() {
            return Err(AdapterError::Firewall(format!(
                "rule file {} already exists (collision)",
                rule_file.display()
            )));
        }

        let ranges = port_spec::parse_ufw_spec(ufw_spec)
            .map_err(|e| AdapterError::Firewall(e.to_string()))?;

        if let Some(parent) = rule_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(rule_file, Self::rule_file_body(rule_name, &ranges))?;

        for range in &ranges {
            let spec = if range.start == range.end {
                format!("{}/{}", range.start, range.proto)
            } else {
                format!("{}:{}/{}", range.start, range.end, range.proto)
            };
            let out = subprocess::run_with_timeout(
                self.ufw_command(&[
                    "allow".to_string(),
                    spec,
                    "comment".to_string(),
                    rule_name.to_string(),
                ]),
                PROBE_TIMEOUT,
                "ufw allow",
            )
            .await?;
            subprocess::require_success("ufw allow", &out)?;
        }

        Ok(())
    }

    async fn disable(&self, rule_file: &Path, rule_name: &str) -> Result<(), AdapterError> {
        let out = subprocess::run_with_timeout(
            self.ufw_command(&["delete".to_string(), "allow".to_string(), rule_name.to_string()]),
            PROBE_TIMEOUT,
            "ufw delete allow",
        )
        .await?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            if !stderr.contains("Could not find") && !stderr.contains("not found") {
                subprocess::require_success("ufw delete allow", &out)?;
            }
        }

        match std::fs::remove_file(rule_file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AdapterError::Io(e)),
        }
    }

    async fn is_enabled(&self, rule_file: &Path) -> Result<bool, AdapterError> {
        Ok(rule_file.exists())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeFirewallAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeFirewallAdapter {
        pub enabled_files: Arc<Mutex<HashSet<PathBuf>>>,
    }

    #[async_trait]
    impl FirewallAdapter for FakeFirewallAdapter {
        async fn enable(&self, rule_file: &Path, _rule_name: &str, ufw_spec: &str) -> Result<(), AdapterError> {
            port_spec::parse_ufw_spec(ufw_spec).map_err(|e| AdapterError::Firewall(e.to_string()))?;
            let mut files = self.enabled_files.lock();
            if files.contains(rule_file) {
                return Err(AdapterError::Firewall("collision".into()));
            }
            files.insert(rule_file.to_path_buf());
            Ok(())
        }

        async fn disable(&self, rule_file: &Path, _rule_name: &str) -> Result<(), AdapterError> {
            self.enabled_files.lock().remove(rule_file);
            Ok(())
        }

        async fn is_enabled(&self, rule_file: &Path) -> Result<bool, AdapterError> {
            Ok(self.enabled_files.lock().contains(rule_file))
        }
    }
}

#[cfg(test)]
#[path = "firewall_tests.rs"]
mod tests;
