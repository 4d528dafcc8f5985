use super::*;
use crate::context::Context;
use crate::registry::InstanceStatus;
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
async fn start_spawns_a_standalone_instance_and_status_reports_it_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");

    orch.start(&ctx, &instance.name).await.expect("start");
    assert_eq!(orch.process.running.lock().get(&instance.pid_file), Some(&true));

    let description = orch.status(&ctx, &instance.name).await.expect("status");
    assert_eq!(description.status, InstanceStatus::Running);
}

#[tokio::test]
async fn stop_marks_a_running_instance_stopped() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");
    orch.start(&ctx, &instance.name).await.expect("start");

    orch.stop(&ctx, &instance.name).await.expect("stop");
    assert_eq!(orch.process.running.lock().get(&instance.pid_file), Some(&false));

    let description = orch.status(&ctx, &instance.name).await.expect("status");
    assert_eq!(description.status, InstanceStatus::Stopped);
}

#[tokio::test]
async fn restart_stops_then_starts_the_instance() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let orch = orchestrator(dir.path());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");
    orch.start(&ctx, &instance.name).await.expect("start");

    orch.restart(&ctx, &instance.name).await.expect("restart");
    assert_eq!(orch.process.running.lock().get(&instance.pid_file), Some(&true));
}
