//! Engine-level errors. Wraps every lower-crate error it calls through and
//! adds the orchestration-specific conditions (§7): instance-running
//! refusals, registry collisions, malformed backup names.

use kgsm_adapters::AdapterError;
use kgsm_blueprint::BlueprintError;
use kgsm_config::ConfigError;
use kgsm_core::backup_name::BackupNameError;
use kgsm_core::port_spec::PortSpecError;
use kgsm_core::KgsmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),
    #[error(transparent)]
    BackupName(#[from] BackupNameError),
    #[error(transparent)]
    PortSpec(#[from] PortSpecError),

    #[error("instance not found: {0}")]
    InstanceNotFound(String),
    #[error("instance {0} is running")]
    InstanceRunning(String),
    #[error("invalid argument: {0}")]
    InvalidArg(String),
    #[error("phase {phase} failed for {instance}: {message}")]
    PhaseFailed {
        instance: String,
        phase: String,
        message: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("event envelope error: {0}")]
    Envelope(String),
    #[error("{integration} integration refused: {path} already exists and is not recorded for this instance")]
    Collision { integration: &'static str, path: String },
}

impl From<EngineError> for KgsmError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Adapter(e) => e.into(),
            EngineError::Config(e) => e.into(),
            EngineError::Blueprint(e) => e.into(),
            EngineError::BackupName(e) => KgsmError::InvalidArg(e.to_string()),
            EngineError::PortSpec(e) => KgsmError::InvalidArg(e.to_string()),
            EngineError::InstanceNotFound(n) => KgsmError::NotFound(n),
            EngineError::InstanceRunning(n) => KgsmError::InstanceRunning(n),
            EngineError::InvalidArg(m) => KgsmError::InvalidArg(m),
            EngineError::PhaseFailed { instance, phase, message } => {
                KgsmError::General(format!("{instance}: phase {phase} failed: {message}"))
            }
            EngineError::Io(e) => KgsmError::Io(e.to_string()),
            EngineError::Envelope(m) => KgsmError::General(m),
            EngineError::Collision { integration: "systemd", path } => {
                KgsmError::Systemd(format!("{path} already exists and is not recorded for this instance"))
            }
            EngineError::Collision { path, .. } => {
                KgsmError::Firewall(format!("{path} already exists and is not recorded for this instance"))
            }
        }
    }
}
