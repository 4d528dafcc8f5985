use super::*;
use crate::context::Context;
use kgsm_adapters::{
    FakeDownloader, FakeFirewallAdapter, FakeLogTailer, FakeProcessAdapter, FakeShortcutAdapter,
    FakeSocketTransport, FakeSystemdAdapter, FakeWebhookTransport, RealUpnpAdapter,
};
use kgsm_blueprint::BlueprintResolver;
use kgsm_core::instance::LifecycleManager;

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

async fn created_instance(orch: &TestOrchestrator, ctx: &Context<kgsm_core::clock::FakeClock>, root: &std::path::Path) -> kgsm_core::instance::Instance {
    orch.create(ctx, "factorio", &root.join("instances-root"), None).await.expect("create")
}

#[tokio::test]
async fn modify_enable_then_disable_firewall_round_trips_the_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let instance = created_instance(&orch, &ctx, dir.path()).await;

    orch.modify(&ctx, &instance.name, ModifyAction::Enable, Integration::Firewall)
        .await
        .expect("enable");
    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert!(reloaded.firewall.enabled);

    orch.modify(&ctx, &instance.name, ModifyAction::Disable, Integration::Firewall)
        .await
        .expect("disable");
    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert!(!reloaded.firewall.enabled);
}

#[tokio::test]
async fn modify_enable_systemd_flips_the_lifecycle_manager() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let instance = created_instance(&orch, &ctx, dir.path()).await;
    assert_eq!(instance.lifecycle_manager, LifecycleManager::Standalone);

    orch.modify(&ctx, &instance.name, ModifyAction::Enable, Integration::Systemd)
        .await
        .expect("enable");
    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert_eq!(reloaded.lifecycle_manager, LifecycleManager::Systemd);
    assert!(reloaded.systemd.enabled);

    orch.modify(&ctx, &instance.name, ModifyAction::Disable, Integration::Systemd)
        .await
        .expect("disable");
    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert_eq!(reloaded.lifecycle_manager, LifecycleManager::Standalone);
    assert!(!reloaded.systemd.enabled);
}

#[tokio::test]
async fn modify_enable_command_shortcut_sets_the_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let instance = created_instance(&orch, &ctx, dir.path()).await;

    orch.modify(&ctx, &instance.name, ModifyAction::Enable, Integration::CommandShortcut)
        .await
        .expect("enable");
    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert!(reloaded.command_shortcut.enabled);

    orch.modify(&ctx, &instance.name, ModifyAction::Disable, Integration::CommandShortcut)
        .await
        .expect("disable");
    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert!(!reloaded.command_shortcut.enabled);
}

#[tokio::test]
async fn modify_enable_port_forwarding_sets_the_synthetic_upnp_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let instance = created_instance(&orch, &ctx, dir.path()).await;

    orch.modify(&ctx, &instance.name, ModifyAction::Enable, Integration::PortForwarding)
        .await
        .expect("enable");
    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert!(reloaded.port_forwarding.enabled);

    orch.modify(&ctx, &instance.name, ModifyAction::Disable, Integration::PortForwarding)
        .await
        .expect("disable");
    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert!(!reloaded.port_forwarding.enabled);
}
