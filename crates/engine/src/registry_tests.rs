use super::*;
use crate::context::Context;
use kgsm_adapters::process::FakeProcessAdapter;
use kgsm_adapters::systemd::FakeSystemdAdapter;
use kgsm_core::blueprint::Runtime;
use kgsm_core::instance::IntegrationState;

fn fixture_instance(name: &str) -> Instance {
    let working_dir = PathBuf::from(format!("/srv/kgsm/{name}"));
    Instance {
        name: name.to_string(),
        blueprint_file: PathBuf::from("/srv/kgsm/blueprints/default/factorio.bp"),
        working_dir: working_dir.clone(),
        version_file: working_dir.join("install").join(".version"),
        config_file: working_dir.join("factorio.config.ini"),
        management_file: working_dir.join("factorio.manage.sh"),
        runtime: Runtime::Native,
        lifecycle_manager: LifecycleManager::Standalone,
        executable_file: "factorio".into(),
        executable_arguments: String::new(),
        launch_dir: working_dir.join("install"),
        ports: "34197/udp".into(),
        stop_command: "quit".into(),
        save_command: "save".into(),
        socket_file: working_dir.join(".stdin"),
        pid_file: working_dir.join(".pid"),
        tail_pid_file: working_dir.join(".tail.pid"),
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

fn registry() -> InstanceRegistry<FakeProcessAdapter, FakeSystemdAdapter> {
    InstanceRegistry::new(FakeProcessAdapter::default(), FakeSystemdAdapter::default())
}

#[test]
fn generate_name_takes_the_blueprint_name_when_unclaimed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let reg = registry();

    let name = reg.generate_name(&ctx, "factorio").expect("generate_name");
    assert_eq!(name, "factorio");
}

#[test]
fn generate_name_draws_a_suffix_once_the_blueprint_name_is_taken() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let reg = registry();

    reg.save(&ctx, "factorio", &fixture_instance("factorio")).expect("save");
    let second = reg.generate_name(&ctx, "factorio").expect("generate_name");

    assert_ne!(second, "factorio");
    assert!(second.starts_with("factorio-"));
    let suffix = second.strip_prefix("factorio-").expect("prefix");
    assert_eq!(suffix.len(), ctx.instance_suffix_length());
}

#[test]
fn save_then_find_then_load_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let reg = registry();
    let instance = fixture_instance("factorio");

    reg.save(&ctx, "factorio", &instance).expect("save");
    let path = reg.find(&ctx, "factorio").expect("find");
    assert!(path.ends_with("instances/factorio/factorio.ini"));

    let loaded = reg.load(&ctx, "factorio").expect("load");
    assert_eq!(loaded, instance);
}

#[test]
fn find_missing_instance_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let reg = registry();

    let err = reg.find(&ctx, "nope").unwrap_err();
    assert!(matches!(err, EngineError::InstanceNotFound(_)));
}

#[test]
fn list_groups_by_blueprint_and_filters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let reg = registry();

    reg.save(&ctx, "factorio", &fixture_instance("factorio")).expect("save");
    reg.save(&ctx, "factorio", &fixture_instance("factorio-42")).expect("save");
    reg.save(&ctx, "valheim", &fixture_instance("valheim")).expect("save");

    let all = reg.list(&ctx, None).expect("list all");
    assert_eq!(all, vec!["factorio", "factorio-42", "valheim"]);

    let only_factorio = reg.list(&ctx, Some("factorio")).expect("list filtered");
    assert_eq!(only_factorio, vec!["factorio", "factorio-42"]);
}

#[test]
fn remove_deletes_the_file_and_empty_blueprint_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let reg = registry();

    reg.save(&ctx, "factorio", &fixture_instance("factorio")).expect("save");
    let path = reg.find(&ctx, "factorio").expect("find");
    let blueprint_dir = path.parent().expect("parent").to_path_buf();

    reg.remove(&ctx, "factorio").expect("remove");

    assert!(!path.exists());
    assert!(!blueprint_dir.exists());
    assert!(matches!(reg.find(&ctx, "factorio").unwrap_err(), EngineError::InstanceNotFound(_)));
}

#[test]
fn remove_keeps_blueprint_dir_if_siblings_remain() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let reg = registry();

    reg.save(&ctx, "factorio", &fixture_instance("factorio")).expect("save");
    reg.save(&ctx, "factorio", &fixture_instance("factorio-42")).expect("save");

    reg.remove(&ctx, "factorio").expect("remove");

    let blueprint_dir = ctx.instances_dir().join("factorio");
    assert!(blueprint_dir.exists());
    assert_eq!(reg.list(&ctx, Some("factorio")).expect("list"), vec!["factorio-42"]);
}

#[tokio::test]
async fn describe_standalone_reflects_process_liveness() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let process = FakeProcessAdapter::default();
    let reg = InstanceRegistry::new(process.clone(), FakeSystemdAdapter::default());

    let instance = fixture_instance("factorio");
    reg.save(&ctx, "factorio", &instance).expect("save");

    let stopped = reg.describe(&ctx, "factorio").await.expect("describe");
    assert_eq!(stopped.status, InstanceStatus::Stopped);

    process.running.lock().insert(instance.pid_file.clone(), true);
    let running = reg.describe(&ctx, "factorio").await.expect("describe");
    assert_eq!(running.status, InstanceStatus::Running);
}

#[tokio::test]
async fn describe_systemd_reflects_unit_activity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let systemd = FakeSystemdAdapter::default();
    let reg = InstanceRegistry::new(FakeProcessAdapter::default(), systemd.clone());

    let mut instance = fixture_instance("factorio");
    instance.lifecycle_manager = LifecycleManager::Systemd;
    instance.systemd = IntegrationState {
        enabled: true,
        artifact_path: Some(PathBuf::from("/etc/systemd/system/kgsm-factorio.service")),
    };
    instance.systemd_socket_file = Some(PathBuf::from("/etc/systemd/system/kgsm-factorio.socket"));
    reg.save(&ctx, "factorio", &instance).expect("save");

    let stopped = reg.describe(&ctx, "factorio").await.expect("describe");
    assert_eq!(stopped.status, InstanceStatus::Stopped);

    systemd.set_active(&systemd_unit_name("factorio"));
    let running = reg.describe(&ctx, "factorio").await.expect("describe");
    assert_eq!(running.status, InstanceStatus::Running);
}
