//! `uninstall(instance)` (§4.3): install, reversed — disable every
//! integration, remove the management file and canonical subdirectories,
//! then drop the instance's own registry entry.

use super::Orchestrator;
use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::{
    Downloader, FirewallAdapter, LogTailer, ProcessAdapter, ShortcutAdapter, SocketTransport, SystemdAdapter,
    UpnpAdapter, WebhookTransport,
};
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
    pub async fn uninstall<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<(), EngineError> {
        let mut instance = self.registry.load(ctx, name)?;
        let blueprint_name = self.blueprint_group_of(&instance)?;

        if self.is_running(&instance).await? {
            return Err(EngineError::InstanceRunning(instance.name.clone()));
        }

        self.emit(
            ctx,
            EventType::InstanceUninstallStarted,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        self.integrations.disable_all(&mut instance).await?;
        self.registry.save(ctx, &blueprint_name, &instance)?;

        match std::fs::remove_file(&instance.management_file) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.emit(
            ctx,
            EventType::InstanceFilesRemoved,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        for dir in instance.canonical_subdir_paths() {
            match std::fs::remove_dir_all(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        match std::fs::remove_dir(&instance.working_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            // Non-canonical leftovers (e.g. operator-added files) keep the
            // directory around; that's the operator's call, not ours.
            Err(e) if e.kind() == std::io::ErrorKind::Other || e.raw_os_error() == Some(39) => {}
            Err(e) => return Err(e.into()),
        }
        self.emit(
            ctx,
            EventType::InstanceDirectoriesRemoved,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        self.registry.remove(ctx, &instance.name)?;

        self.emit(
            ctx,
            EventType::InstanceUninstallFinished,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: Some(blueprint_name.clone()),
            },
        )
        .await;
        self.emit(
            ctx,
            EventType::InstanceUninstalled,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: Some(blueprint_name),
            },
        )
        .await;
        self.emit(
            ctx,
            EventType::InstanceRemoved,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        Ok(())
    }
}

#[cfg(test)]
#[path = "uninstall_tests.rs"]
mod tests;
