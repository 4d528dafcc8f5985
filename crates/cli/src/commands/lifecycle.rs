//! `kgsm install|uninstall|start|stop|restart|status <instance>` (§6).

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Args;
use kgsm_engine::Context;

#[derive(Args, Debug)]
pub struct InstanceArgs {
    pub instance: String,
}

pub async fn install(args: InstanceArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    orch.install(ctx, &args.instance).await.map_err(ExitError::from)?;
    render(format, &args.instance, |name| format!("installed {name}"))
}

pub async fn uninstall(args: InstanceArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    orch.uninstall(ctx, &args.instance).await.map_err(ExitError::from)?;
    render(format, &args.instance, |name| format!("uninstalled {name}"))
}

pub async fn start(args: InstanceArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    orch.start(ctx, &args.instance).await.map_err(ExitError::from)?;
    render(format, &args.instance, |name| format!("started {name}"))
}

pub async fn stop(args: InstanceArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    orch.stop(ctx, &args.instance).await.map_err(ExitError::from)?;
    render(format, &args.instance, |name| format!("stopped {name}"))
}

pub async fn restart(args: InstanceArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    orch.restart(ctx, &args.instance).await.map_err(ExitError::from)?;
    render(format, &args.instance, |name| format!("restarted {name}"))
}

pub async fn status(args: InstanceArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    let description = orch.status(ctx, &args.instance).await.map_err(ExitError::from)?;
    render(format, &description, |d| format!("{}: {:?}", d.instance.name, d.status))
}
