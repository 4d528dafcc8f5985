//! Adapter-level errors, converging into [`kgsm_core::KgsmError`].

use kgsm_core::KgsmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("systemd error: {0}")]
    Systemd(String),
    #[error("firewall error: {0}")]
    Firewall(String),
    #[error("failed to link: {0}")]
    Symlink(String),
    #[error("missing dependency: {0}")]
    MissingDependency(String),
    #[error("permission denied: {0}")]
    Permission(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("subprocess {description} failed: {message}")]
    Subprocess { description: String, message: String },
    #[error("subprocess {description} timed out after {timeout_secs}s")]
    Timeout { description: String, timeout_secs: u64 },
}

impl From<AdapterError> for KgsmError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::Systemd(m) => KgsmError::Systemd(m),
            AdapterError::Firewall(m) => KgsmError::Firewall(m),
            AdapterError::Symlink(m) => KgsmError::FailedLn(m),
            AdapterError::MissingDependency(m) => KgsmError::MissingDependency(m),
            AdapterError::Permission(m) => KgsmError::Permission(m),
            AdapterError::Io(e) => KgsmError::Io(e.to_string()),
            AdapterError::Subprocess { description, message } => {
                KgsmError::General(format!("{description}: {message}"))
            }
            AdapterError::Timeout { description, timeout_secs } => {
                KgsmError::General(format!("{description} timed out after {timeout_secs}s"))
            }
        }
    }
}
