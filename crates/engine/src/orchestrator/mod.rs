//! The Lifecycle Orchestrator (§4.3): compositional pipelines for
//! `create`/`install`/`uninstall`/`update`/`modify`, each a sequence of
//! phases with compensating actions on failure. Submodules hold one
//! operation each; this module holds the shared struct and the plumbing
//! every operation leans on (event emission, start/stop, readiness).

mod backups;
mod create;
mod install;
mod modify;
mod uninstall;
mod update;

pub use modify::{Integration, ModifyAction};
pub use update::UpdateOutcome;

use crate::backup::BackupManager;
use crate::context::Context;
use crate::error::EngineError;
use crate::events::EventDispatcher;
use crate::integrations::IntegrationManager;
use crate::registry::{systemd_unit_name, InstanceRegistry};
use crate::watcher::ReadinessWatcher;
use kgsm_adapters::{
    Downloader, FirewallAdapter, LogTailer, ProcessAdapter, RealDownloader, RealFirewallAdapter,
    RealLogTailer, RealProcessAdapter, RealShortcutAdapter, RealSocketTransport, RealSystemdAdapter,
    RealUpnpAdapter, RealWebhookTransport, ShortcutAdapter, SocketTransport, SystemdAdapter, UpnpAdapter,
    WebhookTransport,
};
use kgsm_blueprint::BlueprintResolver;
use kgsm_core::clock::Clock;
use kgsm_core::event::{EventData, EventType};
use kgsm_core::instance::Instance;
use std::time::Duration;
use tracing::warn;

/// Every collaborator a lifecycle pipeline touches, bundled behind generic
/// adapter types so tests can wire in fakes while production wires in the
/// `Real*` adapters (see [`RealOrchestrator`]).
pub struct Orchestrator<P, S, F, Sh, U, L, Sock, Web, D>
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
    pub(crate) registry: InstanceRegistry<P, S>,
    pub(crate) integrations: IntegrationManager<F, S, Sh, U>,
    pub(crate) backup: BackupManager<P, S>,
    pub(crate) events: EventDispatcher<Sock, Web>,
    pub(crate) watcher: ReadinessWatcher<L, P>,
    pub(crate) resolver: BlueprintResolver,
    pub(crate) downloader: D,
    pub(crate) process: P,
    pub(crate) systemd: S,
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
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        process: P,
        systemd: S,
        firewall: F,
        shortcut: Sh,
        upnp: U,
        log_tailer: L,
        socket: Sock,
        webhook: Web,
        downloader: D,
        resolver: BlueprintResolver,
    ) -> Self {
        Orchestrator {
            registry: InstanceRegistry::new(process.clone(), systemd.clone()),
            integrations: IntegrationManager::new(firewall, systemd.clone(), shortcut, upnp),
            backup: BackupManager::new(process.clone(), systemd.clone()),
            events: EventDispatcher::new(socket, webhook),
            watcher: ReadinessWatcher::new(log_tailer, process.clone()),
            resolver,
            downloader,
            process,
            systemd,
        }
    }

    /// Broadcasts an event without ever failing the calling pipeline (§4.6:
    /// "the Event Dispatcher never blocks orchestration"). A mismatched
    /// envelope shape is a programmer error surfaced as a warning, not
    /// propagated.
    pub(crate) async fn emit<C: Clock>(&self, ctx: &Context<C>, event_type: EventType, data: EventData) {
        if let Err(e) = self.events.emit(ctx, event_type, data).await {
            warn!(?event_type, error = %e, "failed to build event envelope");
        }
    }

    async fn is_running(&self, instance: &Instance) -> Result<bool, EngineError> {
        use kgsm_core::instance::LifecycleManager;
        match instance.lifecycle_manager {
            LifecycleManager::Standalone => Ok(self.process.is_running(&instance.pid_file)?),
            LifecycleManager::Systemd => Ok(self.systemd.is_active(&systemd_unit_name(&instance.name)).await?),
        }
    }

    /// `start(instance)`: native instances are spawned directly; systemd
    /// instances go through `enable_now`'s unit (already enabled at install
    /// time), so starting one here just re-triggers it via `systemctl start`
    /// semantics through `enable_now`, which is idempotent.
    pub async fn start<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<(), EngineError> {
        use kgsm_core::instance::LifecycleManager;
        let instance = self.registry.load(ctx, name)?;
        match instance.lifecycle_manager {
            LifecycleManager::Standalone => {
                let args: Vec<String> = shell_words_lite(&instance.executable_arguments);
                self.process
                    .spawn_detached(&instance.executable_file, &args, &instance.launch_dir, &instance.pid_file)?;
            }
            LifecycleManager::Systemd => {
                self.systemd.enable_now(&systemd_unit_name(&instance.name)).await?;
            }
        }
        self.emit(
            ctx,
            EventType::InstanceStarted,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        if let Some(strategy) = crate::watcher::strategy_for(ctx, &instance)? {
            let watcher = self.watcher.clone();
            let events = self.events.clone();
            let ctx = ctx.clone();
            let instance = instance.clone();
            tokio::spawn(async move {
                match watcher.wait_ready(&ctx, &instance, &strategy).await {
                    Ok(true) => {
                        if let Err(e) = events
                            .emit(
                                &ctx,
                                EventType::InstanceReady,
                                EventData::Instance {
                                    instance_name: instance.name.clone(),
                                    blueprint: None,
                                },
                            )
                            .await
                        {
                            warn!(instance = %instance.name, error = %e, "failed to build instance_ready envelope");
                        }
                    }
                    Ok(false) => {
                        warn!(instance = %instance.name, "readiness watcher gave up without a match");
                    }
                    Err(e) => {
                        warn!(instance = %instance.name, error = %e, "readiness watcher failed");
                    }
                }
            });
        }

        Ok(())
    }

    /// `stop(instance)`: SIGTERM-then-SIGKILL for standalone (§5), `systemctl
    /// stop` for systemd, each bounded by `stop_command_timeout_seconds`.
    pub async fn stop<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<(), EngineError> {
        use kgsm_core::instance::LifecycleManager;
        let instance = self.registry.load(ctx, name)?;
        match instance.lifecycle_manager {
            LifecycleManager::Standalone => {
                self.process
                    .stop(&instance.pid_file, Duration::from_secs(instance.stop_command_timeout_seconds))
                    .await?;
            }
            LifecycleManager::Systemd => {
                self.systemd.stop(&systemd_unit_name(&instance.name)).await?;
            }
        }
        self.emit(
            ctx,
            EventType::InstanceStopped,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;
        Ok(())
    }

    pub async fn restart<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<(), EngineError> {
        self.stop(ctx, name).await?;
        self.start(ctx, name).await
    }

    pub async fn status<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<crate::registry::InstanceDescription, EngineError> {
        self.registry.describe(ctx, name).await
    }

    /// `instances [--list]` (§6): every instance name, optionally restricted
    /// to one blueprint's group.
    pub fn list_instances<C: Clock>(&self, ctx: &Context<C>, blueprint: Option<&str>) -> Result<Vec<String>, EngineError> {
        self.registry.list(ctx, blueprint)
    }

    /// `blueprints [--list]` (§6, §4.2): base names from both sources,
    /// deduplicated and sorted.
    pub fn list_blueprints(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.resolver.list()?)
    }

    /// `blueprints --info <name>` (§6, §4.2).
    pub fn describe_blueprint(&self, name: &str) -> Result<kgsm_blueprint::Blueprint, EngineError> {
        Ok(self.resolver.describe(name)?)
    }

    /// `blueprints --find <name>` (§6, §4.2): the resolved source path.
    pub fn find_blueprint(&self, name: &str) -> Result<std::path::PathBuf, EngineError> {
        Ok(self.resolver.find(name)?)
    }
}

/// Splits an opaque argument string on whitespace. `executable_arguments` is
/// a captured template (§9) with no subshell/arithmetic grammar, so simple
/// whitespace splitting is enough once variable interpolation has already
/// happened — interpolation itself is the management script's job (§1).
fn shell_words_lite(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}

/// The production wiring: every adapter generic bound to its `Real*` impl.
pub type RealOrchestrator = Orchestrator<
    RealProcessAdapter,
    RealSystemdAdapter,
    RealFirewallAdapter,
    RealShortcutAdapter,
    RealUpnpAdapter,
    RealLogTailer,
    RealSocketTransport,
    RealWebhookTransport,
    RealDownloader,
>;

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
