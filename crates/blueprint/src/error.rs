//! Blueprint Resolver errors (§4.2), converging into [`kgsm_core::KgsmError`].

use kgsm_core::KgsmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("blueprint not found: {0}")]
    NotFound(String),
    #[error("malformed blueprint {name}: missing field {field}")]
    MissingField { name: String, field: String },
    #[error("malformed blueprint {name}: invalid value for {field}: {value}")]
    InvalidField { name: String, field: String, value: String },
    #[error("compose descriptor has no services")]
    NoComposeServices,
    #[error("invalid compose yaml: {0}")]
    ComposeYaml(#[from] serde_yaml::Error),
    #[error("invalid port spec: {0}")]
    PortSpec(#[from] kgsm_core::port_spec::PortSpecError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BlueprintError> for KgsmError {
    fn from(e: BlueprintError) -> Self {
        match e {
            BlueprintError::NotFound(n) => KgsmError::NotFound(n),
            BlueprintError::MissingField { name, field } => {
                KgsmError::FailedTemplate(format!("{name}: missing field {field}"))
            }
            BlueprintError::InvalidField { name, field, value } => {
                KgsmError::FailedTemplate(format!("{name}: invalid {field}={value}"))
            }
            BlueprintError::NoComposeServices => {
                KgsmError::FailedTemplate("compose descriptor has no services".into())
            }
            BlueprintError::ComposeYaml(e) => KgsmError::FailedTemplate(e.to_string()),
            BlueprintError::PortSpec(e) => KgsmError::FailedTemplate(e.to_string()),
            BlueprintError::Io(e) => KgsmError::Io(e.to_string()),
        }
    }
}
