//! Closed error enumeration and its mapping to the exit-code enumeration
//! from §6. Every public operation in every KGSM crate ultimately surfaces
//! one of these — no exceptions-as-control-flow, no stringly-typed errors
//! crossing a crate boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process exit codes, per §6. `0` is success and is never constructed as a
/// [`KgsmError`] variant — it's the absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExitCode {
    General = 1,
    InvalidArg = 2,
    MissingArg = 3,
    FileNotFound = 4,
    Permission = 5,
    FailedTemplate = 6,
    FailedSource = 7,
    FailedUpdateConfig = 8,
    FailedRm = 9,
    FailedMv = 10,
    FailedCp = 11,
    FailedLn = 12,
    Systemd = 13,
    Firewall = 14,
    MissingDependency = 15,
    KeyNotFound = 16,
    NotFound = 17,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Closed error enumeration shared across crate boundaries.
///
/// Each component crate (`kgsm-config`, `kgsm-adapters`, `kgsm-blueprint`,
/// `kgsm-engine`) declares its own narrower error enum and converts into
/// this one at its public boundary via `From`, so callers three layers up
/// (the command surface) only ever match on one type.
#[derive(Debug, Error)]
pub enum KgsmError {
    #[error("{0}")]
    General(String),

    #[error("invalid argument: {0}")]
    InvalidArg(String),

    #[error("missing argument: {0}")]
    MissingArg(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("failed to render template: {0}")]
    FailedTemplate(String),

    #[error("failed to fetch source: {0}")]
    FailedSource(String),

    #[error("failed to update config: {0}")]
    FailedUpdateConfig(String),

    #[error("failed to remove: {0}")]
    FailedRm(String),

    #[error("failed to move: {0}")]
    FailedMv(String),

    #[error("failed to copy: {0}")]
    FailedCp(String),

    #[error("failed to link: {0}")]
    FailedLn(String),

    #[error("systemd error: {0}")]
    Systemd(String),

    #[error("firewall error: {0}")]
    Firewall(String),

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("instance is running: {0}")]
    InstanceRunning(String),

    #[error("io error: {0}")]
    Io(String),
}

impl KgsmError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            KgsmError::General(_) => ExitCode::General,
            KgsmError::InvalidArg(_) => ExitCode::InvalidArg,
            KgsmError::MissingArg(_) => ExitCode::MissingArg,
            KgsmError::FileNotFound(_) => ExitCode::FileNotFound,
            KgsmError::Permission(_) => ExitCode::Permission,
            KgsmError::FailedTemplate(_) => ExitCode::FailedTemplate,
            KgsmError::FailedSource(_) => ExitCode::FailedSource,
            KgsmError::FailedUpdateConfig(_) => ExitCode::FailedUpdateConfig,
            KgsmError::FailedRm(_) => ExitCode::FailedRm,
            KgsmError::FailedMv(_) => ExitCode::FailedMv,
            KgsmError::FailedCp(_) => ExitCode::FailedCp,
            KgsmError::FailedLn(_) => ExitCode::FailedLn,
            KgsmError::Systemd(_) => ExitCode::Systemd,
            KgsmError::Firewall(_) => ExitCode::Firewall,
            KgsmError::MissingDependency(_) => ExitCode::MissingDependency,
            KgsmError::KeyNotFound(_) => ExitCode::KeyNotFound,
            KgsmError::NotFound(_) => ExitCode::NotFound,
            // InstanceRunning and Io are recoverable-condition wrappers at
            // the component layer; by the time they reach the command
            // surface they're reported as general failures (§7).
            KgsmError::InstanceRunning(_) => ExitCode::General,
            KgsmError::Io(_) => ExitCode::General,
        }
    }
}

impl From<std::io::Error> for KgsmError {
    fn from(e: std::io::Error) -> Self {
        KgsmError::Io(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
