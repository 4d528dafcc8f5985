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

fn orchestrator(root: &std::path::Path, downloader: FakeDownloader) -> TestOrchestrator {
    Orchestrator::new(
        FakeProcessAdapter::default(),
        FakeSystemdAdapter::default(),
        FakeFirewallAdapter::default(),
        FakeShortcutAdapter::default(),
        RealUpnpAdapter,
        FakeLogTailer { matches: true },
        FakeSocketTransport::default(),
        FakeWebhookTransport::default(),
        downloader,
        BlueprintResolver::new(root.join("blueprints/default"), root.join("blueprints/custom")),
    )
}

#[tokio::test]
async fn update_is_a_no_op_when_already_at_the_latest_version() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let downloader = FakeDownloader::with_version("1.0.0");
    let orch = orchestrator(dir.path(), downloader.clone());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");

    let outcome = orch.update(&ctx, &instance.name, false).await.expect("update");
    assert_eq!(outcome, UpdateOutcome::UpToDate { version: "1.0.0".to_string() });
}

#[tokio::test]
async fn update_forces_a_reinstall_at_the_same_version_when_forced() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let downloader = FakeDownloader::with_version("1.0.0");
    let orch = orchestrator(dir.path(), downloader.clone());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");

    let outcome = orch.update(&ctx, &instance.name, true).await.expect("update");
    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            from: "1.0.0".to_string(),
            to: "1.0.0".to_string()
        }
    );
}

#[tokio::test]
async fn update_bumps_the_installed_version_and_keeps_a_backup() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let downloader = FakeDownloader::with_version("1.0.0");
    let orch = orchestrator(dir.path(), downloader.clone());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");

    *downloader.latest_version.lock() = "2.0.0".to_string();
    let outcome = orch.update(&ctx, &instance.name, false).await.expect("update");
    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            from: "1.0.0".to_string(),
            to: "2.0.0".to_string()
        }
    );

    let reloaded = orch.registry.load(&ctx, &instance.name).expect("reload");
    assert_eq!(reloaded.installed_version, "2.0.0");

    let backups_dir = instance.working_dir.join("backups");
    let entries: Vec<_> = std::fs::read_dir(&backups_dir).expect("read backups dir").collect();
    assert!(!entries.is_empty(), "update should leave a backup behind");
}

#[tokio::test]
async fn update_stops_and_restarts_an_instance_that_was_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_blueprint(dir.path());
    let ctx = Context::for_test(dir.path().to_path_buf());
    let downloader = FakeDownloader::with_version("1.0.0");
    let orch = orchestrator(dir.path(), downloader.clone());
    let install_dir = dir.path().join("instances-root");

    let instance = orch.create(&ctx, "factorio", &install_dir, None).await.expect("create");
    orch.install(&ctx, &instance.name).await.expect("install");
    orch.process.running.lock().insert(instance.pid_file.clone(), true);

    *downloader.latest_version.lock() = "2.0.0".to_string();
    orch.update(&ctx, &instance.name, false).await.expect("update");

    assert_eq!(orch.process.running.lock().get(&instance.pid_file), Some(&true));
}
