//! `create(blueprint, install_dir, [name])` (§4.3): resolve the blueprint,
//! settle on an instance name, and persist the base instance document. Does
//! not touch the filesystem beyond the config store — directory and file
//! materialization is `install`'s job.

use super::Orchestrator;
use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::{
    process::default_pid_file, Downloader, FirewallAdapter, LogTailer, ProcessAdapter, ShortcutAdapter,
    SocketTransport, SystemdAdapter, UpnpAdapter, WebhookTransport,
};
use kgsm_core::blueprint::{Blueprint, Runtime};
use kgsm_core::clock::Clock;
use kgsm_core::event::{EventData, EventType};
use kgsm_core::instance::{Instance, IntegrationState, LifecycleManager};
use std::path::PathBuf;

fn build_instance<C: Clock>(
    ctx: &Context<C>,
    blueprint: &Blueprint,
    blueprint_file: PathBuf,
    install_dir: &std::path::Path,
    name: &str,
) -> Instance {
    let working_dir = install_dir.join(name);
    let subdir_install = working_dir.join("install");
    let launch_dir = if blueprint.executable_subdirectory.is_empty() {
        subdir_install.clone()
    } else {
        subdir_install.join(&blueprint.executable_subdirectory)
    };

    Instance {
        name: name.to_string(),
        blueprint_file,
        version_file: working_dir.join(format!(".{name}.version")),
        config_file: working_dir.join(format!("{name}.config.ini")),
        management_file: working_dir.join(format!("{name}.manage.sh")),
        runtime: blueprint.runtime,
        lifecycle_manager: LifecycleManager::Standalone,
        executable_file: blueprint.executable_file.clone(),
        executable_arguments: blueprint.executable_arguments.clone(),
        launch_dir,
        ports: blueprint.ports.clone(),
        stop_command: blueprint.stop_command.clone(),
        save_command: blueprint.save_command.clone(),
        socket_file: working_dir.join(format!(".{name}.stdin")),
        pid_file: default_pid_file(&working_dir, name),
        tail_pid_file: working_dir.join(format!(".{name}.tail.pid")),
        systemd: IntegrationState::disabled(),
        systemd_socket_file: None,
        firewall: IntegrationState::disabled(),
        command_shortcut: IntegrationState::disabled(),
        port_forwarding: IntegrationState::disabled(),
        upnp_ports: Vec::new(),
        save_command_timeout_seconds: ctx.setting_u64("instance_save_command_timeout_seconds"),
        stop_command_timeout_seconds: ctx.setting_u64("instance_stop_command_timeout_seconds"),
        compress_backups: ctx.setting_bool("enable_backup_compression"),
        auto_update: false,
        install_datetime: ctx.clock.now_rfc3339(),
        installed_version: String::new(),
        working_dir,
    }
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
    /// §4.3 step-by-step: resolve blueprint, settle on a name, write the
    /// base instance document, fold in any runtime-specific adjustments,
    /// then emit `instance_created`. A failure after the config is written
    /// rolls it back — `create` leaves nothing behind on error.
    pub async fn create<C: Clock>(
        &self,
        ctx: &Context<C>,
        blueprint_name: &str,
        install_dir: &std::path::Path,
        name: Option<&str>,
    ) -> Result<Instance, EngineError> {
        let blueprint_file = self.resolver.find(blueprint_name)?;
        let blueprint = self.resolver.describe(blueprint_name)?;

        let instance_name = match name {
            Some(requested) => {
                if self.registry.find(ctx, requested).is_ok() {
                    return Err(EngineError::InvalidArg(format!(
                        "instance name {requested} is already in use"
                    )));
                }
                requested.to_string()
            }
            None => self.registry.generate_name(ctx, &blueprint.name)?,
        };

        let mut instance = build_instance(ctx, &blueprint, blueprint_file, install_dir, &instance_name);
        self.registry.save(ctx, &blueprint.name, &instance)?;

        if let Err(e) = apply_runtime_specifics(&mut instance, &blueprint) {
            let _ = self.registry.remove(ctx, &instance_name);
            return Err(e);
        }
        if let Err(e) = self.registry.save(ctx, &blueprint.name, &instance) {
            let _ = self.registry.remove(ctx, &instance_name);
            return Err(e);
        }

        self.emit(
            ctx,
            EventType::InstanceCreated,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: Some(blueprint.name.clone()),
            },
        )
        .await;

        Ok(instance)
    }
}

/// §3: container blueprints run their whole compose project from the
/// instance's working directory rather than a subdirectory under `install/`.
fn apply_runtime_specifics(instance: &mut Instance, blueprint: &Blueprint) -> Result<(), EngineError> {
    if blueprint.runtime == Runtime::Container {
        instance.launch_dir = instance.working_dir.clone();
    }
    Ok(())
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
