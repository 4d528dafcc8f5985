use super::*;
use crate::context::Context;
use kgsm_adapters::{
    FakeDownloader, FakeFirewallAdapter, FakeLogTailer, FakeProcessAdapter, FakeShortcutAdapter,
    FakeSocketTransport, FakeSystemdAdapter, FakeWebhookTransport, RealUpnpAdapter,
};
use kgsm_blueprint::BlueprintResolver;

const FACTORIO_BP: &str = "runtime=\"native\"\nexecutable_file=\"factorio\"\nports=\"34197/udp\"\nstop_command=\"quit\"\nsave_command=\"save\"\n";

type TestOrchestrator = Orchestrator<
    FakeProcessAdapter,
    FakeSystemdAdapter,
    FakeFirewallAdapter,
    FakeShortcutAdapter,
    RealUpnpAdapter,
    FakeLogTailer,
    FakeSocketTransport,
    FakeWebhookTransport,
    FakeDownloader,
>;

fn write_blueprint(root: &std::path::Path) {
    let bp_dir = root.join("blueprints/default");
    std::fs::create_dir_all(&bp_dir).expect("mkdir");
    std::fs::write(bp_dir.join("factorio.bp"), FACTORIO_BP).expect("write bp");
}

fn orchestrator(root: &std::path::Path) -> TestOrchestrator {
    Orchestrator::new(
        FakeProcessAdapter::default(),
        FakeSystemdAdapter::default(),
        FakeFirewallAdapter::default(),
        FakeShortcutAdapter::default(),
        RealUpnpAdapter,
        FakeLogTailer { matches: true },
        FakeSocketTransport::default(),
        FakeWebhookTransport::default(),
        FakeDownloader::with_version("1.0.0"),
        BlueprintResolver::new(root.join("blueprints/default"), root.join("blueprints/custom")),
    )
}

#[tokio::test]
async fn create_backup_writes_an_archive_under_the_instance_backups_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");

    let name = orch.create_backup(&ctx, &instance.name).await.expect("create_backup");
    let backups_dir = instance.working_dir.join("backups");
    assert!(backups_dir.join(name.to_string()).exists());
}

#[tokio::test]
async fn list_backups_reflects_what_was_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");

    assert!(orch.list_backups(&ctx, &instance.name).expect("list_backups").is_empty());
    orch.create_backup(&ctx, &instance.name).await.expect("create_backup");
    assert_eq!(orch.list_backups(&ctx, &instance.name).expect("list_backups").len(), 1);
}

#[tokio::test]
async fn restore_backup_round_trips_through_the_registry() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");
    let name = orch.create_backup(&ctx, &instance.name).await.expect("create_backup");

    orch.restore_backup(&ctx, &instance.name, &name.to_string())
        .await
        .expect("restore_backup");

    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert_eq!(reloaded.name, instance.name);
}
