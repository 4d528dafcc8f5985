//! `create-backup`/`restore-backup`/`list-backups` (§6, §4.5): the command
//! surface's entry points into the Backup Subsystem, each loading and
//! persisting the instance document around the actual backup/restore call.

use super::Orchestrator;
use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::{
    Downloader, FirewallAdapter, LogTailer, ProcessAdapter, ShortcutAdapter, SocketTransport, SystemdAdapter,
    UpnpAdapter, WebhookTransport,
};
use kgsm_core::backup_name::BackupName;
use kgsm_core::clock::Clock;
use kgsm_core::event::{EventData, EventType};

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
    pub async fn create_backup<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<BackupName, EngineError> {
        let instance = self.registry.load(ctx, name)?;
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
        Ok(backup_name)
    }

    pub async fn restore_backup<C: Clock>(&self, ctx: &Context<C>, name: &str, source: &str) -> Result<(), EngineError> {
        let mut instance = self.registry.load(ctx, name)?;
        let blueprint_name = self.blueprint_group_of(&instance)?;
        self.backup.restore(ctx, &mut instance, source).await?;
        self.registry.save(ctx, &blueprint_name, &instance)?;
        self.emit(
            ctx,
            EventType::InstanceBackupRestored,
            EventData::Backup {
                instance_name: instance.name.clone(),
                source: source.to_string(),
                version: instance.installed_version.clone(),
            },
        )
        .await;
        Ok(())
    }

    pub fn list_backups<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<Vec<BackupName>, EngineError> {
        let instance = self.registry.load(ctx, name)?;
        self.backup.list(&instance)
    }
}

#[cfg(test)]
#[path = "backups_tests.rs"]
mod tests;
