//! Version probe and download for the update pipeline's steps 1-2 (§4.7).
//! Deliberately thin per §1's non-goal ("the thin wrappers for downloading
//! from upstream stores are external collaborators, interface-only") — the
//! update pipeline in `kgsm-engine` owns sequencing, events, and rollback;
//! this adapter only knows how to ask Steam-CLI for a version and fetch it.

use crate::error::AdapterError;
use crate::subprocess::{self, ARCHIVE_TIMEOUT};
use async_trait::async_trait;
use kgsm_core::blueprint::Blueprint;
use std::path::Path;
use tokio::process::Command;

#[async_trait]
pub trait Downloader: Clone + Send + Sync + 'static {
    /// Resolve the latest available version for `blueprint` without
    /// downloading it.
    async fn probe_latest_version(&self, blueprint: &Blueprint) -> Result<String, AdapterError>;

    /// Materialise the blueprint's artifacts into `dest_dir` (a `temp_dir`,
    /// per §4.7 step 2 — deploy is a separate, later step).
    async fn download(&self, blueprint: &Blueprint, dest_dir: &Path) -> Result<(), AdapterError>;
}

/// Drives `steamcmd` anonymously unless `is_steam_account_required`, per the
/// blueprint's `steam_app_id` (§3). Blueprints without a Steam app id have no
/// default path — only a per-blueprint override, which is itself out of
/// scope here.
#[derive(Debug, Clone, Default)]
pub struct RealDownloader;

impl RealDownloader {
    fn require_app_id(blueprint: &Blueprint) -> Result<u32, AdapterError> {
        blueprint.steam_app_id.ok_or_else(|| {
            AdapterError::MissingDependency(format!(
                "blueprint {} has no steam_app_id and no download override",
                blueprint.name
            ))
        })
    }
}

#[async_trait]
impl Downloader for RealDownloader {
    async fn probe_latest_version(&self, blueprint: &Blueprint) -> Result<String, AdapterError> {
        let app_id = Self::require_app_id(blueprint)?;

        let mut cmd = Command::new("steamcmd");
        cmd.arg("+login")
            .arg("anonymous")
            .arg("+app_info_print")
            .arg(app_id.to_string())
            .arg("+quit");
        let out = subprocess::run_with_timeout(cmd, ARCHIVE_TIMEOUT, "steamcmd app_info_print").await?;
        subprocess::require_success("steamcmd app_info_print", &out)?;

        parse_build_id(&String::from_utf8_lossy(&out.stdout)).ok_or_else(|| AdapterError::Subprocess {
            description: "steamcmd app_info_print".to_string(),
            message: "no buildid found in output".to_string(),
        })
    }

    async fn download(&self, blueprint: &Blueprint, dest_dir: &Path) -> Result<(), AdapterError> {
        let app_id = Self::require_app_id(blueprint)?;
        std::fs::create_dir_all(dest_dir)?;

        let mut cmd = Command::new("steamcmd");
        cmd.arg("+force_install_dir")
            .arg(dest_dir)
            .arg("+login")
            .arg("anonymous")
            .arg("+app_update")
            .arg(app_id.to_string())
            .arg("validate")
            .arg("+quit");
        let out = subprocess::run_with_timeout(cmd, ARCHIVE_TIMEOUT, "steamcmd app_update").await?;
        subprocess::require_success("steamcmd app_update", &out)
    }
}

fn parse_build_id(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let line = line.trim();
        line.strip_prefix("\"buildid\"")
            .map(|rest| rest.trim().trim_matches('"').to_string())
    })
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDownloader;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeDownloader {
        pub latest_version: Arc<Mutex<String>>,
        pub fail_download: Arc<Mutex<bool>>,
    }

    impl FakeDownloader {
        pub fn with_version(version: impl Into<String>) -> Self {
            let d = Self::default();
            *d.latest_version.lock() = version.into();
            d
        }
    }

    #[async_trait]
    impl Downloader for FakeDownloader {
        async fn probe_latest_version(&self, _blueprint: &Blueprint) -> Result<String, AdapterError> {
            Ok(self.latest_version.lock().clone())
        }

        async fn download(&self, _blueprint: &Blueprint, dest_dir: &Path) -> Result<(), AdapterError> {
            if *self.fail_download.lock() {
                return Err(AdapterError::Subprocess {
                    description: "download".to_string(),
                    message: "forced failure".to_string(),
                });
            }
            std::fs::create_dir_all(dest_dir)?;
            std::fs::write(dest_dir.join("artifact.bin"), b"fake-artifact")?;
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
