use super::*;
use crate::process::fake::FakeProcessAdapter;

#[test]
fn default_pid_file_is_dotfile_under_working_dir() {
    let path = default_pid_file(Path::new("/srv/kgsm/factorio"), "factorio");
    assert_eq!(path, PathBuf::from("/srv/kgsm/factorio/.factorio.pid"));
}

#[tokio::test]
async fn fake_adapter_tracks_running_state_across_spawn_and_stop() {
    let adapter = FakeProcessAdapter::default();
    let pid_file = PathBuf::from("/srv/kgsm/factorio/.factorio.pid");
    adapter
        .spawn_detached("factorio", &[], Path::new("/srv/kgsm/factorio/install"), &pid_file)
        .expect("spawn");
    assert!(adapter.is_running(&pid_file).expect("is_running"));

    adapter.stop(&pid_file, Duration::from_secs(1)).await.expect("stop");
    assert!(!adapter.is_running(&pid_file).expect("is_running"));
}

#[test]
fn real_adapter_reports_not_running_when_pid_file_absent() {
    let adapter = RealProcessAdapter;
    let missing = PathBuf::from("/nonexistent/path/.x.pid");
    assert!(!adapter.is_running(&missing).expect("is_running"));
}
