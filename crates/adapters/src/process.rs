//! PID-file and signal based control for the `standalone` lifecycle manager
//! (§3 `lifecycle_manager ∈ {standalone, systemd}`). Used when an instance
//! has no systemd integration enabled.

use crate::error::AdapterError;
use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    /// Spawn `program` detached from this invocation (it must outlive the
    /// command surface process that launched it) and record its PID.
    fn spawn_detached(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
        pid_file: &Path,
    ) -> Result<u32, AdapterError>;

    fn is_running(&self, pid_file: &Path) -> Result<bool, AdapterError>;

    /// SIGTERM, wait up to `timeout`, SIGKILL if still alive (§5
    /// "stop_command_timeout_seconds after which the instance is
    /// force-terminated").
    async fn stop(&self, pid_file: &Path, timeout: Duration) -> Result<(), AdapterError>;

    fn force_kill(&self, pid_file: &Path) -> Result<(), AdapterError>;
}

fn read_pid(pid_file: &Path) -> Result<Option<Pid>, AdapterError> {
    match std::fs::read_to_string(pid_file) {
        Ok(contents) => Ok(contents.trim().parse::<i32>().ok().map(Pid::from_raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AdapterError::Io(e)),
    }
}

fn process_alive(pid: Pid) -> bool {
    // A zero-signal kill probes existence without actually signalling.
    signal::kill(pid, None).is_ok()
}

#[derive(Debug, Clone, Default)]
pub struct RealProcessAdapter;

#[async_trait]
impl ProcessAdapter for RealProcessAdapter {
    fn spawn_detached(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
        pid_file: &Path,
    ) -> Result<u32, AdapterError> {
        let child = std::process::Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .spawn()?;
        let pid = child.id();
        std::fs::write(pid_file, pid.to_string())?;
        // Intentionally not awaited/reaped: the child must outlive this
        // invocation. Dropping a std::process::Child does not kill it.
        debug!(pid, program, "spawned detached process");
        Ok(pid)
    }

    fn is_running(&self, pid_file: &Path) -> Result<bool, AdapterError> {
        match read_pid(pid_file)? {
            Some(pid) => Ok(process_alive(pid)),
            None => Ok(false),
        }
    }

    async fn stop(&self, pid_file: &Path, timeout: Duration) -> Result<(), AdapterError> {
        let Some(pid) = read_pid(pid_file)? else {
            return Ok(());
        };
        if !process_alive(pid) {
            return Ok(());
        }

        if signal::kill(pid, Signal::SIGTERM).is_err() {
            // Already gone between the liveness check and the signal.
            return Ok(());
        }

        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if !process_alive(pid) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        warn!(pid = pid.as_raw(), "process did not exit after SIGTERM, force-killing");
        self.force_kill(pid_file)
    }

    fn force_kill(&self, pid_file: &Path) -> Result<(), AdapterError> {
        if let Some(pid) = read_pid(pid_file)? {
            let _ = signal::kill(pid, Signal::SIGKILL);
        }
        Ok(())
    }
}

pub fn default_pid_file(working_dir: &Path, instance: &str) -> PathBuf {
    working_dir.join(format!(".{instance}.pid"))
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProcessAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeProcessAdapter {
        /// pid_file -> "running" flag, purely in-memory.
        pub running: Arc<Mutex<HashMap<PathBuf, bool>>>,
    }

    #[async_trait]
    impl ProcessAdapter for FakeProcessAdapter {
        fn spawn_detached(
            &self,
            _program: &str,
            _args: &[String],
            _working_dir: &Path,
            pid_file: &Path,
        ) -> Result<u32, AdapterError> {
            self.running.lock().insert(pid_file.to_path_buf(), true);
            Ok(4242)
        }

        fn is_running(&self, pid_file: &Path) -> Result<bool, AdapterError> {
            Ok(*self.running.lock().get(pid_file).unwrap_or(&false))
        }

        async fn stop(&self, pid_file: &Path, _timeout: Duration) -> Result<(), AdapterError> {
            self.running.lock().insert(pid_file.to_path_buf(), false);
            Ok(())
        }

        fn force_kill(&self, pid_file: &Path) -> Result<(), AdapterError> {
            self.running.lock().insert(pid_file.to_path_buf(), false);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
