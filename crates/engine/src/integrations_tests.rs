use super::*;
use crate::context::Context;
use kgsm_adapters::{FakeFirewallAdapter, FakeShortcutAdapter, FakeSystemdAdapter, RealUpnpAdapter};
use kgsm_core::blueprint::Runtime;
use kgsm_core::instance::LifecycleManager;
use std::path::PathBuf;

fn manager() -> IntegrationManager<FakeFirewallAdapter, FakeSystemdAdapter, FakeShortcutAdapter, RealUpnpAdapter> {
    IntegrationManager::new(
        FakeFirewallAdapter::default(),
        FakeSystemdAdapter::default(),
        FakeShortcutAdapter::default(),
        RealUpnpAdapter,
    )
}

fn fixture_instance(dir: &std::path::Path) -> Instance {
    Instance {
        name: "factorio".into(),
        blueprint_file: dir.join("blueprints/default/factorio.bp"),
        working_dir: dir.join("factorio"),
        version_file: dir.join("factorio/install/.version"),
        config_file: dir.join("factorio/factorio.config.ini"),
        management_file: dir.join("factorio/factorio.manage.sh"),
        runtime: Runtime::Native,
        lifecycle_manager: LifecycleManager::Standalone,
        executable_file: "factorio".into(),
        executable_arguments: "--start-server save".into(),
        launch_dir: dir.join("factorio/install"),
        ports: "34197/udp".into(),
        stop_command: "quit".into(),
        save_command: "save".into(),
        socket_file: dir.join("factorio/.stdin"),
        pid_file: dir.join("factorio/.pid"),
        tail_pid_file: dir.join("factorio/.tail.pid"),
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

#[tokio::test]
async fn enable_firewall_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let mgr = manager();
    let mut instance = fixture_instance(dir.path());

    mgr.enable_firewall(&ctx, &mut instance).await.expect("enable");
    assert!(instance.firewall.enabled);
    let artifact = instance.firewall.artifact_path.clone().expect("artifact");

    mgr.enable_firewall(&ctx, &mut instance).await.expect("enable again");
    assert_eq!(instance.firewall.artifact_path, Some(artifact));
}

#[tokio::test]
async fn enable_firewall_repairs_a_partial_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let mgr = manager();
    let mut instance = fixture_instance(dir.path());

    // Flag says enabled, but nothing was ever recorded on the adapter side.
    instance.firewall.enabled = true;

    mgr.enable_firewall(&ctx, &mut instance).await.expect("self-repair enable");
    assert!(instance.firewall.artifact_path.is_some());
}

#[tokio::test]
async fn enable_firewall_refuses_a_pre_existing_unrelated_rule_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let mut instance = fixture_instance(dir.path());
    let rule_file = ctx.firewall_rules_dir().join(format!("kgsm-{}", instance.name));

    let firewall = FakeFirewallAdapter::default();
    firewall.enabled_files.lock().insert(rule_file);
    let mgr = IntegrationManager::new(firewall, FakeSystemdAdapter::default(), FakeShortcutAdapter::default(), RealUpnpAdapter);

    let err = mgr.enable_firewall(&ctx, &mut instance).await.unwrap_err();
    assert!(matches!(err, EngineError::Collision { integration: "firewall", .. }));
    assert!(!instance.firewall.enabled);
}

#[tokio::test]
async fn disable_firewall_clears_state_and_is_tolerant_of_absence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let mgr = manager();
    let mut instance = fixture_instance(dir.path());

    mgr.enable_firewall(&ctx, &mut instance).await.expect("enable");
    mgr.disable_firewall(&mut instance).await.expect("disable");
    assert!(!instance.firewall.enabled);
    assert!(instance.firewall.artifact_path.is_none());

    mgr.disable_firewall(&mut instance).await.expect("disable again is a no-op");
}

#[tokio::test]
async fn enable_systemd_writes_unit_and_enables_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let mgr = manager();
    let mut instance = fixture_instance(dir.path());

    mgr.enable_systemd(&ctx, &mut instance).await.expect("enable");
    assert!(instance.systemd.enabled);
    let unit_file = instance.systemd.artifact_path.clone().expect("artifact");
    assert!(unit_file.exists());
    let body = std::fs::read_to_string(&unit_file).expect("read unit");
    assert!(body.contains("ExecStart=factorio --start-server save"));
}

#[tokio::test]
async fn enable_systemd_refuses_a_pre_existing_unrelated_unit_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let mgr = manager();
    let mut instance = fixture_instance(dir.path());
    let unit_file = ctx.systemd_files_dir().join(systemd_unit_name(&instance.name));
    std::fs::create_dir_all(unit_file.parent().expect("parent")).expect("mkdir");
    std::fs::write(&unit_file, "# not ours").expect("write");

    let err = mgr.enable_systemd(&ctx, &mut instance).await.unwrap_err();
    assert!(matches!(err, EngineError::Collision { integration: "systemd", .. }));
    assert!(!instance.systemd.enabled);
    assert_eq!(std::fs::read_to_string(&unit_file).expect("still there"), "# not ours");
}

#[test]
fn enable_shortcut_creates_a_symlink_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let mgr = manager();
    let mut instance = fixture_instance(dir.path());

    mgr.enable_shortcut(&ctx, &mut instance).expect("enable");
    assert!(instance.command_shortcut.enabled);
    assert_eq!(
        instance.command_shortcut.artifact_path,
        Some(ctx.command_shortcuts_dir().join("factorio"))
    );
}

#[test]
fn enable_upnp_derives_ports_and_a_synthetic_artifact_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mgr = manager();
    let mut instance = fixture_instance(dir.path());

    mgr.enable_upnp(&mut instance).expect("enable");
    assert!(instance.port_forwarding.enabled);
    assert_eq!(instance.upnp_ports, vec!["34197/udp".to_string()]);
    assert_eq!(
        instance.port_forwarding.artifact_path,
        Some(instance.working_dir.join(".upnp"))
    );
    // Never materialised on disk.
    assert!(!PathBuf::from(&instance.working_dir.join(".upnp")).exists());
}

#[test]
fn disable_upnp_clears_ports_and_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mgr = manager();
    let mut instance = fixture_instance(dir.path());

    mgr.enable_upnp(&mut instance).expect("enable");
    mgr.disable_upnp(&mut instance).expect("disable");
    assert!(!instance.port_forwarding.enabled);
    assert!(instance.upnp_ports.is_empty());
}
