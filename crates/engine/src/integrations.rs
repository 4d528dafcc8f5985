//! The Integration Manager (§4.4): idempotent enable/disable for the four
//! integration kinds, each wrapping its `kgsm-adapters` trait and
//! self-repairing when the flag and artifact have drifted out of sync.

use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::{FirewallAdapter, ShortcutAdapter, SystemdAdapter, UpnpAdapter};
use kgsm_core::clock::Clock;
use kgsm_core::instance::{Instance, IntegrationState};
use kgsm_core::port_spec;
use tracing::warn;

/// Whether a flag and its on-host artifact agree (§9 "absent / partial /
/// present" integration state machine). `FlaggedButMissing` is ours to
/// repair — the flag says we own it, the artifact just needs rebuilding.
/// `Collision` is someone else's artifact wearing our file name — §4.4
/// requires refusing rather than overwriting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Absent,
    FlaggedButMissing,
    Collision,
    Present,
}

fn classify(flag: bool, artifact_present: bool) -> Presence {
    match (flag, artifact_present) {
        (true, true) => Presence::Present,
        (false, false) => Presence::Absent,
        (true, false) => Presence::FlaggedButMissing,
        (false, true) => Presence::Collision,
    }
}

fn systemd_unit_name(instance_name: &str) -> String {
    crate::registry::systemd_unit_name(instance_name)
}

fn firewall_rule_name(instance_name: &str) -> String {
    format!("kgsm-{instance_name}")
}

fn render_systemd_unit(instance: &Instance) -> String {
    format!(
        "[Unit]\nDescription=KGSM managed instance {name}\nAfter=network.target\n\n\
         [Service]\nType=simple\nWorkingDirectory={launch_dir}\n\
         ExecStart={exec} {args}\nExecStop={management} stop\nRestart=on-failure\n\n\
         [Install]\nWantedBy=multi-user.target\n",
        name = instance.name,
        launch_dir = instance.launch_dir.display(),
        exec = instance.executable_file,
        args = instance.executable_arguments,
        management = instance.management_file.display(),
    )
}

pub struct IntegrationManager<F, Sy, Sh, U>
where
    F: FirewallAdapter,
    Sy: SystemdAdapter,
    Sh: ShortcutAdapter,
    U: UpnpAdapter,
{
    firewall: F,
    systemd: Sy,
    shortcut: Sh,
    upnp: U,
}

impl<F, Sy, Sh, U> IntegrationManager<F, Sy, Sh, U>
where
    F: FirewallAdapter,
    Sy: SystemdAdapter,
    Sh: ShortcutAdapter,
    U: UpnpAdapter,
{
    pub fn new(firewall: F, systemd: Sy, shortcut: Sh, upnp: U) -> Self {
        IntegrationManager {
            firewall,
            systemd,
            shortcut,
            upnp,
        }
    }

    pub async fn enable_firewall<C: Clock>(
        &self,
        ctx: &Context<C>,
        instance: &mut Instance,
    ) -> Result<(), EngineError> {
        let rule_file = ctx.firewall_rules_dir().join(firewall_rule_name(&instance.name));
        let rule_name = firewall_rule_name(&instance.name);
        let artifact_present = self.firewall.is_enabled(&rule_file).await?;

        match classify(instance.firewall.enabled, artifact_present) {
            Presence::Present => return Ok(()),
            Presence::FlaggedButMissing => {
                warn!(instance = %instance.name, "firewall integration flagged but missing, repairing");
                self.firewall.disable(&rule_file, &rule_name).await?;
            }
            Presence::Collision => {
                return Err(EngineError::Collision {
                    integration: "firewall",
                    path: rule_file.display().to_string(),
                });
            }
            Presence::Absent => {}
        }

        self.firewall.enable(&rule_file, &rule_name, &instance.ports).await?;
        instance.firewall = IntegrationState {
            enabled: true,
            artifact_path: Some(rule_file),
        };
        Ok(())
    }

    pub async fn disable_firewall(&self, instance: &mut Instance) -> Result<(), EngineError> {
        if let Some(rule_file) = instance.firewall.artifact_path.clone() {
            self.firewall.disable(&rule_file, &firewall_rule_name(&instance.name)).await?;
        }
        instance.firewall = IntegrationState::disabled();
        Ok(())
    }

    pub async fn enable_systemd<C: Clock>(
        &self,
        ctx: &Context<C>,
        instance: &mut Instance,
    ) -> Result<(), EngineError> {
        let unit = systemd_unit_name(&instance.name);
        let unit_file = ctx.systemd_files_dir().join(&unit);
        let artifact_present = unit_file.exists();

        match classify(instance.systemd.enabled, artifact_present) {
            Presence::Present => return Ok(()),
            Presence::FlaggedButMissing => {
                warn!(instance = %instance.name, "systemd integration flagged but missing, repairing");
                let _ = self.systemd.stop(&unit).await;
                let _ = self.systemd.disable(&unit).await;
                let _ = std::fs::remove_file(&unit_file);
            }
            Presence::Collision => {
                return Err(EngineError::Collision {
                    integration: "systemd",
                    path: unit_file.display().to_string(),
                });
            }
            Presence::Absent => {}
        }

        if let Some(parent) = unit_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&unit_file, render_systemd_unit(instance))?;
        self.systemd.daemon_reload().await?;
        self.systemd.enable_now(&unit).await?;

        instance.systemd = IntegrationState {
            enabled: true,
            artifact_path: Some(unit_file),
        };
        Ok(())
    }

    pub async fn disable_systemd(&self, instance: &mut Instance) -> Result<(), EngineError> {
        let unit = systemd_unit_name(&instance.name);
        self.systemd.stop(&unit).await?;
        self.systemd.disable(&unit).await?;
        if let Some(unit_file) = instance.systemd.artifact_path.clone() {
            match std::fs::remove_file(&unit_file) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.systemd.daemon_reload().await?;
        instance.systemd = IntegrationState::disabled();
        Ok(())
    }

    pub fn enable_shortcut<C: Clock>(
        &self,
        ctx: &Context<C>,
        instance: &mut Instance,
    ) -> Result<(), EngineError> {
        let shortcut_dir = ctx.command_shortcuts_dir();
        let shortcut_path = shortcut_dir.join(&instance.name);
        let artifact_present = shortcut_path.symlink_metadata().is_ok();

        if classify(instance.command_shortcut.enabled, artifact_present) == Presence::Present {
            return Ok(());
        }

        let created = self.shortcut.enable(&shortcut_dir, &instance.name, &instance.management_file)?;
        instance.command_shortcut = IntegrationState {
            enabled: true,
            artifact_path: Some(created),
        };
        Ok(())
    }

    pub fn disable_shortcut(&self, instance: &mut Instance) -> Result<(), EngineError> {
        if let Some(path) = instance.command_shortcut.artifact_path.clone() {
            self.shortcut.disable(&path)?;
        }
        instance.command_shortcut = IntegrationState::disabled();
        Ok(())
    }

    /// §4.4: "purely a configuration flag toggle plus a pre-computed
    /// `upnp_ports[]` array; no host mutation." The synthetic
    /// `working_dir/.upnp` artifact path (never written to disk) exists only
    /// to satisfy the uniform [`IntegrationState::is_consistent`] invariant.
    pub fn enable_upnp(&self, instance: &mut Instance) -> Result<(), EngineError> {
        if instance.port_forwarding.enabled {
            return Ok(());
        }
        let ports = self.upnp.enable(&instance.ports)?;
        instance.upnp_ports = ports.iter().map(|p| p.to_string()).collect();
        instance.port_forwarding = IntegrationState {
            enabled: true,
            artifact_path: Some(instance.working_dir.join(".upnp")),
        };
        Ok(())
    }

    pub fn disable_upnp(&self, instance: &mut Instance) -> Result<(), EngineError> {
        self.upnp.disable()?;
        instance.upnp_ports.clear();
        instance.port_forwarding = IntegrationState::disabled();
        Ok(())
    }

    /// Enables every integration flagged in `instance` at call time — used
    /// by `install` (§4.3) to apply whatever the blueprint/user configured.
    pub async fn enable_all_configured<C: Clock>(
        &self,
        ctx: &Context<C>,
        instance: &mut Instance,
        want_firewall: bool,
        want_systemd: bool,
        want_shortcut: bool,
        want_upnp: bool,
    ) -> Result<(), EngineError> {
        if want_firewall {
            self.enable_firewall(ctx, instance).await?;
        }
        if want_upnp {
            self.enable_upnp(instance)?;
        }
        if want_shortcut {
            self.enable_shortcut(ctx, instance)?;
        }
        if want_systemd {
            self.enable_systemd(ctx, instance).await?;
        }
        Ok(())
    }

    /// Disables every currently-enabled integration — used by `uninstall`.
    pub async fn disable_all(&self, instance: &mut Instance) -> Result<(), EngineError> {
        if instance.systemd.enabled {
            self.disable_systemd(instance).await?;
        }
        if instance.command_shortcut.enabled {
            self.disable_shortcut(instance)?;
        }
        if instance.port_forwarding.enabled {
            self.disable_upnp(instance)?;
        }
        if instance.firewall.enabled {
            self.disable_firewall(instance).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "integrations_tests.rs"]
mod tests;
