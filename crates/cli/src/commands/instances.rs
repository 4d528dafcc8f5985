//! `kgsm instances [--list] [--blueprint <name>]` (§6, §4.8).

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Args;
use kgsm_engine::Context;

#[derive(Args, Debug)]
pub struct InstancesArgs {
    /// Restrict the listing to one blueprint's instance group.
    #[arg(long = "blueprint", value_name = "NAME")]
    pub blueprint: Option<String>,
}

pub async fn list(args: InstancesArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    let names = orch
        .list_instances(ctx, args.blueprint.as_deref())
        .map_err(ExitError::from)?;

    render(format, &names, |names| {
        if names.is_empty() {
            "no instances".to_string()
        } else {
            names.join("\n")
        }
    })
}
