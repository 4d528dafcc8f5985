//! The Update Pipeline (§4.7): version probe, download, stop-if-running,
//! backup, deploy, restore-if-was-running, record version. All-or-nothing on
//! `installed_version` (§8 property 4) — a failure at any step after the
//! backup leaves the prior install and prior `installed_version` intact,
//! since the backup step is what `restore` would roll back to.

use super::Orchestrator;
use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::{
    Downloader, FirewallAdapter, LogTailer, ProcessAdapter, ShortcutAdapter, SocketTransport, SystemdAdapter,
    UpnpAdapter, WebhookTransport,
};
use kgsm_core::clock::Clock;
use kgsm_core::event::{EventData, EventType};
use kgsm_core::instance::Instance;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum UpdateOutcome {
    /// Probed version matches `installed_version` and the caller did not
    /// force a reinstall (§4.7 step 1: "equality of version is success
    /// non-interactively unless `--yes`").
    UpToDate { version: String },
    Updated { from: String, to: String },
}

fn clear_dir(dir: &std::path::Path) -> Result<(), EngineError> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Moves every entry out of `temp_dir` into `install_dir`, overlaying
/// whatever was already deployed. Per-entry `rename` keeps each individual
/// move atomic even though the directory as a whole is built up entry by
/// entry.
pub(super) fn deploy_temp_to_install(instance: &Instance) -> Result<(), EngineError> {
    let temp = instance.temp_dir();
    let install = instance.install_dir();
    clear_dir(&install)?;
    std::fs::create_dir_all(&install)?;
    for entry in std::fs::read_dir(&temp)? {
        let entry = entry?;
        std::fs::rename(entry.path(), install.join(entry.file_name()))?;
    }
    Ok(())
}

impl<P, S, F, Sh, U, L, Sock, Web, D> Orchestrator<P, S, F, Sh, U, L, Sock, Web, D>
where
    P: ProcessAdapter,
    S: SystemdAdapter,
    F: FirewallAdapter,
    Sh: ShortcutAdapter,
    U: UpnpAdapter,
    L: LogTailer,
    Sock: SocketTransport,
    Web: WebhookTransport,
    D: Downloader,
{
    /// `force`: the `--yes` flag (§9 open question, resolved). Without it, a
    /// version-probe match is a no-op success rather than a forced
    /// reinstall.
    pub async fn update<C: Clock>(&self, ctx: &Context<C>, name: &str, force: bool) -> Result<UpdateOutcome, EngineError> {
        let mut instance = self.registry.load(ctx, name)?;
        let blueprint_name = self.blueprint_group_of(&instance)?;
        let blueprint = self.resolver.describe(&blueprint_name)?;

        self.emit(
            ctx,
            EventType::InstanceUpdateStarted,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        let latest = self.downloader.probe_latest_version(&blueprint).await?;
        if latest == instance.installed_version && !force {
            info!(instance = %instance.name, version = %latest, "already at latest version");
            return Ok(UpdateOutcome::UpToDate { version: latest });
        }

        self.emit(
            ctx,
            EventType::InstanceDownloadStarted,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;
        self.downloader.download(&blueprint, &instance.temp_dir()).await?;
        self.emit(
            ctx,
            EventType::InstanceDownloadFinished,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;
        self.emit(
            ctx,
            EventType::InstanceDownloaded,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        let was_running = self.is_running(&instance).await?;
        if was_running {
            self.stop(ctx, &instance.name).await?;
        }

        // Any backup failure aborts the pipeline before the current install
        // is touched (§4.7 step 4).
        let backup_name = self.backup.create(ctx, &instance).await?;
        self.emit(
            ctx,
            EventType::InstanceBackupCreated,
            EventData::Backup {
                instance_name: instance.name.clone(),
                source: backup_name.to_string(),
                version: instance.installed_version.clone(),
            },
        )
        .await;

        self.emit(
            ctx,
            EventType::InstanceDeployStarted,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;
        deploy_temp_to_install(&instance)?;
        self.emit(
            ctx,
            EventType::InstanceDeployFinished,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;
        self.emit(
            ctx,
            EventType::InstanceDeployed,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        if was_running {
            self.start(ctx, &instance.name).await?;
        }

        let old_version = instance.installed_version.clone();
        instance.installed_version = latest.clone();
        self.registry.save(ctx, &blueprint_name, &instance)?;

        self.emit(
            ctx,
            EventType::InstanceVersionUpdated,
            EventData::VersionUpdated {
                instance_name: instance.name.clone(),
                old_version: old_version.clone(),
                new_version: latest.clone(),
            },
        )
        .await;
        self.emit(
            ctx,
            EventType::InstanceUpdateFinished,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;
        self.emit(
            ctx,
            EventType::InstanceUpdated,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        Ok(UpdateOutcome::Updated { from: old_version, to: latest })
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
