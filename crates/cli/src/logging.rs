//! Operational logging for the command surface: a rotating file under
//! `KGSM_ROOT/kgsm.log`, independent of the per-instance `logs/` directory
//! the orchestrator writes to. Library crates only ever emit `tracing`
//! events; this module is the one place that turns those into bytes on
//! disk.

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

/// Shifts `kgsm.log` → `kgsm.log.1` → `kgsm.log.2` → `kgsm.log.3`, dropping
/// the oldest. Best-effort: a rotation failure never blocks startup.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

/// Sets up the stderr subscriber and the rotating file log. Returns a guard
/// that must be held for the lifetime of `main` — dropping it early silently
/// truncates buffered log lines.
pub fn init(root: &std::path::Path, verbose: bool) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_path = root.join("kgsm.log");
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    rotate_log_if_needed(&log_path);

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().ok_or_else(|| anyhow::anyhow!("log path has no parent"))?,
        log_path.file_name().ok_or_else(|| anyhow::anyhow!("log path has no file name"))?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
