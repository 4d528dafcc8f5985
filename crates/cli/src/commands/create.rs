//! `kgsm create <blueprint> --install-dir <d> [--name <n>]` (§6).

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Args;
use kgsm_engine::Context;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Blueprint name to instantiate.
    pub blueprint: String,

    #[arg(long = "install-dir", value_name = "DIR")]
    pub install_dir: PathBuf,

    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Also run `install` immediately after `create`.
    #[arg(long)]
    pub install: bool,
}

pub async fn handle(args: CreateArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    let instance = orch
        .create(ctx, &args.blueprint, &args.install_dir, args.name.as_deref())
        .await
        .map_err(ExitError::from)?;

    if args.install {
        orch.install(ctx, &instance.name).await.map_err(ExitError::from)?;
    }

    render(format, &instance, |i| format!("created instance {}", i.name))
}
