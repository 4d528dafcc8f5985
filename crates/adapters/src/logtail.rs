//! Log-pattern strategy for the Readiness Watcher (§4.9): tail the latest
//! log file under `logs_dir` and report the first line matching
//! `startup_success_regex`.

use crate::error::AdapterError;
use regex::Regex;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The most recently modified file directly under `logs_dir`, or `None` if
/// the directory is empty.
pub fn latest_log_file(logs_dir: &Path) -> Result<Option<PathBuf>, AdapterError> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(logs_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let is_newer = match &newest {
            Some((t, _)) => modified > *t,
            None => true,
        };
        if is_newer {
            newest = Some((modified, entry.path()));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

pub trait LogTailer: Clone + Send + Sync + 'static {
    /// Poll `log_file` for a line matching `pattern`, starting from the
    /// file's current end, at `poll_interval`, until `timeout` elapses.
    /// Returns `true` on first match, `false` on timeout.
    fn wait_for_pattern(
        &self,
        log_file: &Path,
        pattern: &Regex,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<bool, AdapterError>;
}

#[derive(Debug, Clone, Default)]
pub struct RealLogTailer;

impl LogTailer for RealLogTailer {
    fn wait_for_pattern(
        &self,
        log_file: &Path,
        pattern: &Regex,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<bool, AdapterError> {
        use std::io::Read;

        let mut file = std::fs::File::open(log_file)?;
        let mut offset = file.seek(SeekFrom::End(0))?;
        let deadline = std::time::Instant::now() + timeout;

        loop {
            let len = file.metadata()?.len();
            if len > offset {
                file.seek(SeekFrom::Start(offset))?;
                let mut buf = String::new();
                file.read_to_string(&mut buf)?;
                offset = len;
                if buf.lines().any(|line| pattern.is_match(line)) {
                    return Ok(true);
                }
            }

            if std::time::Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(poll_interval);
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLogTailer;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;

    #[derive(Debug, Clone)]
    pub struct FakeLogTailer {
        pub matches: bool,
    }

    impl LogTailer for FakeLogTailer {
        fn wait_for_pattern(
            &self,
            _log_file: &Path,
            _pattern: &Regex,
            _poll_interval: Duration,
            _timeout: Duration,
        ) -> Result<bool, AdapterError> {
            Ok(self.matches)
        }
    }
}

#[cfg(test)]
#[path = "logtail_tests.rs"]
mod tests;
