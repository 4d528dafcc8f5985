//! `install(instance)` / `uninstall(instance)` (§4.3): the directory and
//! file materialization half of the lifecycle, sandwiched between
//! `installation_started`/`installed` events. `uninstall` is install's
//! mirror image, run in reverse order.

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

fn management_script_body(instance: &Instance) -> String {
    format!(
        "#!/usr/bin/env bash\n# generated by kgsm for instance {name}\n\
         set -euo pipefail\ncase \"${{1:-}}\" in\n\
         start) exec \"{exec}\" {args} ;;\n\
         stop) {stop} ;;\n\
         save) {save} ;;\n\
         *) echo \"usage: $0 {{start|stop|save}}\" >&2; exit 1 ;;\nesac\n",
        name = instance.name,
        exec = instance.executable_file,
        args = instance.executable_arguments,
        stop = instance.stop_command,
        save = instance.save_command,
    )
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
    /// §4.3: directories → management file → integrations → download →
    /// deploy, bracketed by `installation_started`/`installed`.
    pub async fn install<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<(), EngineError> {
        let mut instance = self.registry.load(ctx, name)?;
        let blueprint_name = self.blueprint_group_of(&instance)?;

        self.emit(
            ctx,
            EventType::InstanceInstallationStarted,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: Some(blueprint_name.clone()),
            },
        )
        .await;

        for dir in instance.canonical_subdir_paths() {
            std::fs::create_dir_all(&dir)?;
        }
        self.emit(
            ctx,
            EventType::InstanceDirectoriesCreated,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        std::fs::write(&instance.management_file, management_script_body(&instance))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&instance.management_file)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&instance.management_file, perms)?;
        }
        self.emit(
            ctx,
            EventType::InstanceFilesCreated,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;

        // Integrations are toggled by `modify` between `create` and
        // `install` (§8: right after `create` every flag is false); this
        // pass re-applies whatever is already flagged, self-repairing any
        // partial state left by a previously interrupted install.
        let (want_firewall, want_systemd, want_shortcut, want_upnp) = (
            instance.firewall.enabled,
            instance.systemd.enabled,
            instance.command_shortcut.enabled,
            instance.port_forwarding.enabled,
        );
        self.integrations
            .enable_all_configured(ctx, &mut instance, want_firewall, want_systemd, want_shortcut, want_upnp)
            .await?;
        self.registry.save(ctx, &blueprint_name, &instance)?;

        let blueprint = self.resolver.describe(&blueprint_name)?;
        self.emit(
            ctx,
            EventType::InstanceDownloadStarted,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;
        let version = self.downloader.probe_latest_version(&blueprint).await?;
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

        self.emit(
            ctx,
            EventType::InstanceDeployStarted,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: None,
            },
        )
        .await;
        super::update::deploy_temp_to_install(&instance)?;
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

        instance.installed_version = version;
        self.registry.save(ctx, &blueprint_name, &instance)?;

        self.emit(
            ctx,
            EventType::InstanceInstallationFinished,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: Some(blueprint_name.clone()),
            },
        )
        .await;
        self.emit(
            ctx,
            EventType::InstanceInstalled,
            EventData::Instance {
                instance_name: instance.name.clone(),
                blueprint: Some(blueprint_name),
            },
        )
        .await;

        info!(instance = %instance.name, "install complete");
        Ok(())
    }

    pub(super) fn blueprint_group_of(&self, instance: &Instance) -> Result<String, EngineError> {
        instance
            .blueprint_file
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| EngineError::InvalidArg(format!("malformed blueprint_file for {}", instance.name)))
    }
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
