use super::*;
use kgsm_core::instance::CANONICAL_SUBDIRS;

fn sample_instance() -> Instance {
    let working_dir = PathBuf::from("/srv/kgsm/factorio");
    Instance {
        name: "factorio".into(),
        blueprint_file: PathBuf::from("/srv/kgsm/blueprints/default/factorio.bp"),
        working_dir: working_dir.clone(),
        version_file: working_dir.join("install").join(".factorio.version"),
        config_file: working_dir.join("factorio.config.ini"),
        management_file: working_dir.join("factorio.manage.sh"),
        runtime: Runtime::Native,
        lifecycle_manager: LifecycleManager::Standalone,
        executable_file: "factorio".into(),
        executable_arguments: "--start-server save".into(),
        launch_dir: working_dir.join("install"),
        ports: "34197/udp".into(),
        stop_command: "quit".into(),
        save_command: "save".into(),
        socket_file: working_dir.join(".factorio.stdin"),
        pid_file: working_dir.join(".factorio.pid"),
        tail_pid_file: working_dir.join(".factorio.tail.pid"),
        systemd: IntegrationState::disabled(),
        systemd_socket_file: None,
        firewall: IntegrationState::disabled(),
        command_shortcut: IntegrationState::disabled(),
        port_forwarding: IntegrationState::disabled(),
        upnp_ports: vec![],
        save_command_timeout_seconds: 5,
        stop_command_timeout_seconds: 30,
        compress_backups: false,
        auto_update: false,
        install_datetime: "2026-07-26T10:00:00Z".into(),
        installed_version: "1.2.3".into(),
    }
}

#[test]
fn round_trips_a_standalone_instance() {
    let instance = sample_instance();
    let doc = instance_to_document(&instance);
    let back = document_to_instance(&doc).expect("should parse back");
    assert_eq!(back, instance);
}

#[test]
fn round_trips_a_systemd_instance_with_upnp() {
    let mut instance = sample_instance();
    instance.lifecycle_manager = LifecycleManager::Systemd;
    instance.systemd = IntegrationState {
        enabled: true,
        artifact_path: Some(PathBuf::from("/etc/systemd/system/factorio.service")),
    };
    instance.systemd_socket_file = Some(PathBuf::from("/etc/systemd/system/factorio.socket"));
    instance.port_forwarding = IntegrationState {
        enabled: true,
        artifact_path: Some(instance.working_dir.join(".upnp")),
    };
    instance.upnp_ports = vec!["34197/udp".to_string()];

    let doc = instance_to_document(&instance);
    let back = document_to_instance(&doc).expect("should parse back");
    assert_eq!(back, instance);
}

#[test]
fn written_document_carries_the_inject_anchor_comment() {
    let doc = instance_to_document(&sample_instance());
    let rendered = doc.render();
    assert!(rendered.contains(INJECT_CONFIG_ANCHOR));
}

#[test]
fn missing_required_key_is_an_error() {
    let doc = ConfigDocument::default();
    let err = document_to_instance(&doc).unwrap_err();
    assert!(matches!(err, EngineError::InvalidArg(_)));
}

#[test]
fn canonical_subdirs_constant_has_five_entries() {
    // §3 names "six" canonical subdirs but both the data-model text and the
    // §6 layout diagram only ever list five; kgsm-core's CANONICAL_SUBDIRS
    // follows the enumerated five.
    assert_eq!(CANONICAL_SUBDIRS.len(), 5);
}
