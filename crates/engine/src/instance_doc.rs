//! Serialization between [`Instance`] and the on-disk `key=value` document
//! (§6 "Instance config file format"). This bridges `kgsm-core`'s pure data
//! shape and `kgsm-config`'s document type, so it lives here rather than in
//! either of those crates.

use crate::error::EngineError;
use kgsm_config::document::{ConfigDocument, Value};
use kgsm_core::blueprint::Runtime;
use kgsm_core::instance::{Instance, IntegrationState, LifecycleManager};
use std::path::PathBuf;

fn scalar(s: impl Into<String>) -> Value {
    Value::Scalar(s.into())
}

fn path_or_empty(p: &Option<PathBuf>) -> String {
    p.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
}

fn non_empty_path(raw: &str) -> Option<PathBuf> {
    if raw.is_empty() {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}

/// §6 anchor used when materialising the management script; kept here since
/// it's the one ordering-sensitive anchor point in the instance document.
pub const INJECT_CONFIG_ANCHOR: &str = "# === BEGIN INJECT CONFIG ===";

pub fn instance_to_document(instance: &Instance) -> ConfigDocument {
    let mut doc = ConfigDocument::default();
    doc.set("name", scalar(&instance.name), None);
    doc.set("blueprint_file", scalar(instance.blueprint_file.display().to_string()), None);
    doc.set("working_dir", scalar(instance.working_dir.display().to_string()), None);
    doc.set("version_file", scalar(instance.version_file.display().to_string()), None);
    doc.set("config_file", scalar(instance.config_file.display().to_string()), None);
    doc.set("management_file", scalar(instance.management_file.display().to_string()), None);

    doc.set(
        "runtime",
        scalar(match instance.runtime {
            Runtime::Native => "native",
            Runtime::Container => "container",
        }),
        None,
    );
    doc.set(
        "lifecycle_manager",
        scalar(match instance.lifecycle_manager {
            LifecycleManager::Standalone => "standalone",
            LifecycleManager::Systemd => "systemd",
        }),
        None,
    );
    doc.set("executable_file", scalar(&instance.executable_file), None);
    doc.set("executable_arguments", scalar(&instance.executable_arguments), None);
    doc.set("launch_dir", scalar(instance.launch_dir.display().to_string()), None);
    doc.set("ports", scalar(&instance.ports), None);
    doc.set("stop_command", scalar(&instance.stop_command), None);
    doc.set("save_command", scalar(&instance.save_command), None);
    doc.set("socket_file", scalar(instance.socket_file.display().to_string()), None);
    doc.set("pid_file", scalar(instance.pid_file.display().to_string()), None);
    doc.set("tail_pid_file", scalar(instance.tail_pid_file.display().to_string()), None);

    doc.set("enable_systemd", scalar(instance.systemd.enabled.to_string()), None);
    doc.set("systemd_service_file", scalar(path_or_empty(&instance.systemd.artifact_path)), None);
    doc.set("systemd_socket_file", scalar(path_or_empty(&instance.systemd_socket_file)), None);

    doc.set(
        "enable_firewall_management",
        scalar(instance.firewall.enabled.to_string()),
        None,
    );
    doc.set("firewall_rule_file", scalar(path_or_empty(&instance.firewall.artifact_path)), None);

    doc.set(
        "enable_command_shortcuts",
        scalar(instance.command_shortcut.enabled.to_string()),
        None,
    );
    doc.set(
        "command_shortcut_file",
        scalar(path_or_empty(&instance.command_shortcut.artifact_path)),
        None,
    );

    doc.set(
        "enable_port_forwarding",
        scalar(instance.port_forwarding.enabled.to_string()),
        None,
    );
    doc.set("upnp_ports", Value::Array(instance.upnp_ports.clone()), None);

    doc.set(
        "save_command_timeout_seconds",
        scalar(instance.save_command_timeout_seconds.to_string()),
        None,
    );
    doc.set(
        "stop_command_timeout_seconds",
        scalar(instance.stop_command_timeout_seconds.to_string()),
        None,
    );
    doc.set("compress_backups", scalar(instance.compress_backups.to_string()), None);
    doc.set("auto_update", scalar(instance.auto_update.to_string()), None);

    doc.set("install_datetime", scalar(&instance.install_datetime), None);
    doc.set("installed_version", scalar(&instance.installed_version), None);

    // Anchor comment for the management-script template injection point
    // (§6). Appended once so later `set` calls on other keys never move it.
    if doc.get("__inject_anchor__").is_none() {
        doc.set("__inject_anchor__", scalar("present"), Some(INJECT_CONFIG_ANCHOR));
    }

    doc
}

fn get_string(doc: &ConfigDocument, key: &str) -> Result<String, EngineError> {
    match doc.get(key) {
        Some(Value::Scalar(s)) => Ok(s),
        Some(Value::Array(_)) => Err(EngineError::InvalidArg(format!("{key} is an array, expected scalar"))),
        None => Err(EngineError::InvalidArg(format!("missing key {key}"))),
    }
}

fn get_bool(doc: &ConfigDocument, key: &str) -> Result<bool, EngineError> {
    Ok(get_string(doc, key)? == "true")
}

fn get_u64(doc: &ConfigDocument, key: &str) -> Result<u64, EngineError> {
    get_string(doc, key)?
        .parse()
        .map_err(|_| EngineError::InvalidArg(format!("{key} is not an integer")))
}

fn get_array(doc: &ConfigDocument, key: &str) -> Vec<String> {
    match doc.get(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

pub fn document_to_instance(doc: &ConfigDocument) -> Result<Instance, EngineError> {
    let runtime = match get_string(doc, "runtime")?.as_str() {
        "native" => Runtime::Native,
        "container" => Runtime::Container,
        other => return Err(EngineError::InvalidArg(format!("unknown runtime {other}"))),
    };
    let lifecycle_manager = match get_string(doc, "lifecycle_manager")?.as_str() {
        "standalone" => LifecycleManager::Standalone,
        "systemd" => LifecycleManager::Systemd,
        other => return Err(EngineError::InvalidArg(format!("unknown lifecycle_manager {other}"))),
    };

    Ok(Instance {
        name: get_string(doc, "name")?,
        blueprint_file: PathBuf::from(get_string(doc, "blueprint_file")?),
        working_dir: PathBuf::from(get_string(doc, "working_dir")?),
        version_file: PathBuf::from(get_string(doc, "version_file")?),
        config_file: PathBuf::from(get_string(doc, "config_file")?),
        management_file: PathBuf::from(get_string(doc, "management_file")?),
        runtime,
        lifecycle_manager,
        executable_file: get_string(doc, "executable_file")?,
        executable_arguments: get_string(doc, "executable_arguments")?,
        launch_dir: PathBuf::from(get_string(doc, "launch_dir")?),
        ports: get_string(doc, "ports")?,
        stop_command: get_string(doc, "stop_command")?,
        save_command: get_string(doc, "save_command")?,
        socket_file: PathBuf::from(get_string(doc, "socket_file")?),
        pid_file: PathBuf::from(get_string(doc, "pid_file")?),
        tail_pid_file: PathBuf::from(get_string(doc, "tail_pid_file")?),
        systemd: IntegrationState {
            enabled: get_bool(doc, "enable_systemd")?,
            artifact_path: non_empty_path(&get_string(doc, "systemd_service_file")?),
        },
        systemd_socket_file: non_empty_path(&get_string(doc, "systemd_socket_file")?),
        firewall: IntegrationState {
            enabled: get_bool(doc, "enable_firewall_management")?,
            artifact_path: non_empty_path(&get_string(doc, "firewall_rule_file")?),
        },
        command_shortcut: IntegrationState {
            enabled: get_bool(doc, "enable_command_shortcuts")?,
            artifact_path: non_empty_path(&get_string(doc, "command_shortcut_file")?),
        },
        port_forwarding: {
            let enabled = get_bool(doc, "enable_port_forwarding")?;
            let working_dir = PathBuf::from(get_string(doc, "working_dir")?);
            IntegrationState {
                enabled,
                // UPnP has no on-disk artifact (§4.4): the synthetic marker
                // keeps the uniform IntegrationState consistency invariant
                // satisfied without implying a materialized file.
                artifact_path: enabled.then(|| working_dir.join(".upnp")),
            }
        },
        upnp_ports: get_array(doc, "upnp_ports"),
        save_command_timeout_seconds: get_u64(doc, "save_command_timeout_seconds")?,
        stop_command_timeout_seconds: get_u64(doc, "stop_command_timeout_seconds")?,
        compress_backups: get_bool(doc, "compress_backups")?,
        auto_update: get_bool(doc, "auto_update")?,
        install_datetime: get_string(doc, "install_datetime")?,
        installed_version: get_string(doc, "installed_version")?,
    })
}

#[cfg(test)]
#[path = "instance_doc_tests.rs"]
mod tests;
