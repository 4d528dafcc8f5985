//! Process-wide settings: the enumerated known keys and defaults from
//! §4.1, plus `validate`.

use crate::document::{ConfigDocument, Value};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    Bool,
    Int,
    Str,
}

#[derive(Debug, Clone, Copy)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub ty: SettingType,
}

pub const SETTINGS: &[SettingDef] = &[
    SettingDef { key: "instance_suffix_length", default: "2", ty: SettingType::Int },
    SettingDef { key: "enable_event_broadcasting", default: "false", ty: SettingType::Bool },
    SettingDef { key: "enable_webhook_events", default: "false", ty: SettingType::Bool },
    SettingDef { key: "webhook_urls", default: "", ty: SettingType::Str },
    SettingDef { key: "webhook_timeout_seconds", default: "10", ty: SettingType::Int },
    SettingDef { key: "webhook_retry_count", default: "2", ty: SettingType::Int },
    SettingDef { key: "webhook_secret", default: "", ty: SettingType::Str },
    SettingDef { key: "event_socket_filename", default: "kgsm.sock", ty: SettingType::Str },
    SettingDef { key: "watcher_timeout_seconds", default: "600", ty: SettingType::Int },
    SettingDef { key: "enable_backup_compression", default: "false", ty: SettingType::Bool },
    SettingDef { key: "enable_port_forwarding", default: "false", ty: SettingType::Bool },
    SettingDef { key: "instance_save_command_timeout_seconds", default: "5", ty: SettingType::Int },
    SettingDef { key: "instance_stop_command_timeout_seconds", default: "30", ty: SettingType::Int },
    SettingDef { key: "systemd_files_dir", default: "", ty: SettingType::Str },
    SettingDef { key: "firewall_rules_dir", default: "", ty: SettingType::Str },
    SettingDef { key: "command_shortcuts_directory", default: "", ty: SettingType::Str },
];

pub fn find(key: &str) -> Option<&'static SettingDef> {
    SETTINGS.iter().find(|s| s.key == key)
}

pub fn is_known_key(key: &str) -> bool {
    find(key).is_some()
}

/// A document seeded with every known key's default, used when initialising
/// a fresh `config.ini` or by `config reset` (§6).
pub fn defaults_document() -> ConfigDocument {
    let mut doc = ConfigDocument::default();
    for setting in SETTINGS {
        doc.set(setting.key, Value::Scalar(setting.default.to_string()), None);
    }
    doc
}

fn type_matches(ty: SettingType, value: &Value) -> bool {
    match (ty, value) {
        (SettingType::Str, _) => true,
        (SettingType::Bool, Value::Scalar(s)) => s == "true" || s == "false",
        (SettingType::Int, Value::Scalar(s)) => s.parse::<u64>().is_ok(),
        (SettingType::Bool, Value::Array(_)) | (SettingType::Int, Value::Array(_)) => false,
    }
}

/// `validate`: every *recognised* key's value must match its declared type.
/// Unrecognised keys are not flagged here — that enforcement is `set`'s
/// `InvalidKey` error, not validation of an existing document.
pub fn validate(doc: &ConfigDocument) -> Result<(), ConfigError> {
    for key in doc.keys() {
        let Some(setting) = find(key) else { continue };
        let value = doc.get(key).expect("key just enumerated");
        if !type_matches(setting.ty, &value) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// `set` on the process-wide config rejects unknown keys (§4.1).
pub fn check_known(key: &str) -> Result<(), ConfigError> {
    if is_known_key(key) {
        Ok(())
    } else {
        Err(ConfigError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
