//! Config Store errors (§4.1), converging into [`kgsm_core::KgsmError`] at
//! this crate's public boundary.

use kgsm_core::KgsmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(String),
    #[error("permission denied: {0}")]
    Permission(String),
    #[error("unknown key: {0}")]
    InvalidKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for KgsmError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::FileNotFound(p) => KgsmError::FileNotFound(p),
            ConfigError::Permission(p) => KgsmError::Permission(p),
            ConfigError::InvalidKey(k) => KgsmError::KeyNotFound(k),
            ConfigError::InvalidValue { key, value } => {
                KgsmError::InvalidArg(format!("{key}={value}"))
            }
            ConfigError::Io(e) => KgsmError::Io(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
