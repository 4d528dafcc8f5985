//! `kgsm blueprints [--list|--info <name>|--find <name>]` (§6, §4.2).

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Args;
use kgsm_engine::Context;

#[derive(Args, Debug)]
pub struct BlueprintsArgs {
    #[arg(long = "info", value_name = "NAME")]
    pub info: Option<String>,

    #[arg(long = "find", value_name = "NAME")]
    pub find: Option<String>,
}

pub async fn handle(args: BlueprintsArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);

    if let Some(name) = args.info {
        let blueprint = orch.describe_blueprint(&name).map_err(ExitError::from)?;
        return render(format, &blueprint, |b| format!("{b:#?}"));
    }

    if let Some(name) = args.find {
        let path = orch.find_blueprint(&name).map_err(ExitError::from)?;
        let rendered = path.display().to_string();
        return render(format, &rendered, |p| p.clone());
    }

    let names = orch.list_blueprints().map_err(ExitError::from)?;
    render(format, &names, |names| {
        if names.is_empty() {
            "no blueprints".to_string()
        } else {
            names.join("\n")
        }
    })
}
