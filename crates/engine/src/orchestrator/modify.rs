//! `modify(instance, action, integration)` (§4.3): enable/disable a single
//! integration on an already-installed instance, delegating the actual
//! enable/disable work to the Integration Manager (§4.4) and persisting the
//! resulting flags through the registry.

use super::Orchestrator;
use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::{
    Downloader, FirewallAdapter, LogTailer, ProcessAdapter, ShortcutAdapter, SocketTransport, SystemdAdapter,
    UpnpAdapter, WebhookTransport,
};
use kgsm_core::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    Firewall,
    Systemd,
    CommandShortcut,
    PortForwarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyAction {
    Enable,
    Disable,
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
    pub async fn modify<C: Clock>(
        &self,
        ctx: &Context<C>,
        name: &str,
        action: ModifyAction,
        integration: Integration,
    ) -> Result<(), EngineError> {
        let mut instance = self.registry.load(ctx, name)?;
        let blueprint_name = self.blueprint_group_of(&instance)?;

        match (action, integration) {
            (ModifyAction::Enable, Integration::Firewall) => {
                self.integrations.enable_firewall(ctx, &mut instance).await?
            }
            (ModifyAction::Disable, Integration::Firewall) => {
                self.integrations.disable_firewall(&mut instance).await?
            }
            (ModifyAction::Enable, Integration::Systemd) => {
                self.integrations.enable_systemd(ctx, &mut instance).await?;
                instance.lifecycle_manager = kgsm_core::instance::LifecycleManager::Systemd;
            }
            (ModifyAction::Disable, Integration::Systemd) => {
                self.integrations.disable_systemd(&mut instance).await?;
                instance.lifecycle_manager = kgsm_core::instance::LifecycleManager::Standalone;
            }
            (ModifyAction::Enable, Integration::CommandShortcut) => {
                self.integrations.enable_shortcut(ctx, &mut instance)?
            }
            (ModifyAction::Disable, Integration::CommandShortcut) => {
                self.integrations.disable_shortcut(&mut instance)?
            }
            (ModifyAction::Enable, Integration::PortForwarding) => self.integrations.enable_upnp(&mut instance)?,
            (ModifyAction::Disable, Integration::PortForwarding) => self.integrations.disable_upnp(&mut instance)?,
        }

        self.registry.save(ctx, &blueprint_name, &instance)
    }
}

#[cfg(test)]
#[path = "modify_tests.rs"]
mod tests;
