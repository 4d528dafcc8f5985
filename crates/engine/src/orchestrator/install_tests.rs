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
async fn install_materializes_directories_management_file_and_deployed_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");

    for dir in instance.canonical_subdir_paths() {
        assert!(dir.exists(), "{dir:?} should exist after install");
    }
    assert!(instance.management_file.exists());
    assert!(instance.install_dir().join("artifact.bin").exists());

    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert_eq!(reloaded.installed_version, "1.0.0");
}

#[tokio::test]
async fn install_applies_integrations_enabled_by_a_prior_modify_call() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.modify(&ctx, &instance.name, ModifyAction::Enable, Integration::Firewall)
        .await
        .expect("modify");
    orch.install(&ctx, &instance.name).await.expect("install");

    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert!(reloaded.firewall.enabled);
    assert!(reloaded.firewall.artifact_path.is_some());
}
