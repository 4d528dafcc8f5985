//! `kgsm update <instance> [--yes]` (§6, §4.7, §9 open question resolved:
//! equality-of-version refuses to reinstall unless `--yes` forces it).

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Args;
use kgsm_engine::{Context, UpdateOutcome};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub instance: String,

    /// Reinstall even if the probed version matches `installed_version`.
    #[arg(long = "yes")]
    pub force: bool,
}

pub async fn handle(args: UpdateArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    let outcome = orch
        .update(ctx, &args.instance, args.force)
        .await
        .map_err(ExitError::from)?;

    render(format, &outcome, |o| match o {
        UpdateOutcome::UpToDate { version } => format!("{} is already at {version}", args.instance),
        UpdateOutcome::Updated { from, to } => format!("{} updated {from} -> {to}", args.instance),
    })
}
