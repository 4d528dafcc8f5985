//! Timeout-wrapped subprocess execution, the building block every other
//! adapter in this crate (systemd, firewall, backup tar, download) runs its
//! external commands through.

use crate::error::AdapterError;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for quick CLI probes (`systemctl is-active`, `ufw status`).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for service-manager mutations (`systemctl enable`,
/// `daemon-reload`).
pub const SYSTEMD_MUTATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for archive operations (`tar -czf`, `tar -xzf`).
pub const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(300);

/// Run a subprocess command with a timeout. The child is killed when the
/// timeout elapses (via tokio's `Child` drop behavior).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, AdapterError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(AdapterError::Subprocess {
            description: description.to_string(),
            message: io_err.to_string(),
        }),
        Err(_elapsed) => Err(AdapterError::Timeout {
            description: description.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// `Ok(())` if the command exited successfully, else an error carrying
/// stderr.
pub fn require_success(description: &str, output: &Output) -> Result<(), AdapterError> {
    if output.status.success() {
        Ok(())
    } else {
        Err(AdapterError::Subprocess {
            description: description.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
