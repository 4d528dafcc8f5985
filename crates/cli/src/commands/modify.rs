//! `kgsm modify <instance> --add|--remove <systemd|ufw|symlink|upnp>` (§6).

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::{Args, ValueEnum};
use kgsm_engine::{Integration as EngineIntegration, ModifyAction as EngineModifyAction};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum IntegrationArg {
    Systemd,
    Ufw,
    Symlink,
    Upnp,
}

impl From<IntegrationArg> for EngineIntegration {
    fn from(arg: IntegrationArg) -> Self {
        match arg {
            IntegrationArg::Systemd => EngineIntegration::Systemd,
            IntegrationArg::Ufw => EngineIntegration::Firewall,
            IntegrationArg::Symlink => EngineIntegration::CommandShortcut,
            IntegrationArg::Upnp => EngineIntegration::PortForwarding,
        }
    }
}

#[derive(Args, Debug)]
pub struct ModifyArgs {
    pub instance: String,

    /// Enable the named integration.
    #[arg(long = "add", value_enum)]
    pub add: Option<IntegrationArg>,

    /// Disable the named integration.
    #[arg(long = "remove", value_enum)]
    pub remove: Option<IntegrationArg>,
}

pub async fn handle(args: ModifyArgs, ctx: &kgsm_engine::Context, format: OutputFormat) -> anyhow::Result<()> {
    let (action, integration) = match (args.add, args.remove) {
        (Some(i), None) => (EngineModifyAction::Enable, i.into()),
        (None, Some(i)) => (EngineModifyAction::Disable, i.into()),
        _ => anyhow::bail!("exactly one of --add or --remove is required"),
    };

    let orch = super::build_orchestrator(ctx);
    orch.modify(ctx, &args.instance, action, integration)
        .await
        .map_err(ExitError::from)?;

    render(format, &args.instance, |name| format!("modified {name}"))
}
