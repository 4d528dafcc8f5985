//! Parses a `.bp` file's `key=value` document (§3, §6) into a
//! [`Blueprint`].

use crate::error::BlueprintError;
use kgsm_config::{ConfigDocument, Value};
use kgsm_core::blueprint::{Blueprint, Runtime};

fn scalar(doc: &ConfigDocument, name: &str, field: &str) -> Result<String, BlueprintError> {
    match doc.get(field) {
        Some(Value::Scalar(s)) => Ok(s),
        Some(Value::Array(_)) => Err(BlueprintError::InvalidField {
            name: name.to_string(),
            field: field.to_string(),
            value: "(array)".to_string(),
        }),
        None => Err(BlueprintError::MissingField {
            name: name.to_string(),
            field: field.to_string(),
        }),
    }
}

fn scalar_or_default(doc: &ConfigDocument, field: &str, default: &str) -> String {
    match doc.get(field) {
        Some(Value::Scalar(s)) => s,
        _ => default.to_string(),
    }
}

fn scalar_bool(doc: &ConfigDocument, field: &str) -> bool {
    scalar_or_default(doc, field, "false") == "true"
}

/// Parse a `.bp` document. `name` is the blueprint's file stem (the `.bp`
/// grammar has no separate name field of its own — the file name is the
/// identity, per §4.2's resolver semantics).
pub fn parse_bp_document(name: &str, doc: &ConfigDocument) -> Result<Blueprint, BlueprintError> {
    let runtime_str = scalar_or_default(doc, "runtime", "native");
    let runtime = match runtime_str.as_str() {
        "native" => Runtime::Native,
        "container" => Runtime::Container,
        other => {
            return Err(BlueprintError::InvalidField {
                name: name.to_string(),
                field: "runtime".to_string(),
                value: other.to_string(),
            })
        }
    };

    let steam_app_id = match doc.get("steam_app_id") {
        Some(Value::Scalar(s)) if !s.is_empty() => Some(s.parse::<u32>().map_err(|_| {
            BlueprintError::InvalidField {
                name: name.to_string(),
                field: "steam_app_id".to_string(),
                value: s.clone(),
            }
        })?),
        _ => None,
    };

    Ok(Blueprint {
        name: name.to_string(),
        runtime,
        ports: scalar_or_default(doc, "ports", ""),
        executable_file: scalar(doc, name, "executable_file")?,
        executable_subdirectory: scalar_or_default(doc, "executable_subdirectory", ""),
        executable_arguments: scalar_or_default(doc, "executable_arguments", ""),
        level_name: scalar_or_default(doc, "level_name", ""),
        stop_command: scalar_or_default(doc, "stop_command", ""),
        save_command: scalar_or_default(doc, "save_command", ""),
        steam_app_id,
        is_steam_account_required: scalar_bool(doc, "is_steam_account_required"),
        platform: scalar_or_default(doc, "platform", "linux"),
        compose_ports: vec![],
    })
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
