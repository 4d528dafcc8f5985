//! `kgsm create-backup|restore-backup <instance> [<source>]`,
//! `kgsm list-backups <instance>` (§6, §4.5).

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Args;
use kgsm_engine::Context;

#[derive(Args, Debug)]
pub struct CreateBackupArgs {
    pub instance: String,
}

#[derive(Args, Debug)]
pub struct RestoreBackupArgs {
    pub instance: String,

    /// Bare backup file name (resolved under the instance's `backups/`
    /// directory) or a full path.
    pub source: String,
}

#[derive(Args, Debug)]
pub struct ListBackupsArgs {
    pub instance: String,
}

pub async fn create(args: CreateBackupArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    let name = orch.create_backup(ctx, &args.instance).await.map_err(ExitError::from)?;
    let rendered = name.to_string();
    render(format, &rendered, |n| format!("backup created: {n}"))
}

pub async fn restore(args: RestoreBackupArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    orch.restore_backup(ctx, &args.instance, &args.source)
        .await
        .map_err(ExitError::from)?;
    render(format, &args.instance, |name| format!("restored {name} from {}", args.source))
}

pub async fn list(args: ListBackupsArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let orch = super::build_orchestrator(ctx);
    let names: Vec<String> = orch
        .list_backups(ctx, &args.instance)
        .map_err(ExitError::from)?
        .iter()
        .map(ToString::to_string)
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text => {
            if names.is_empty() {
                println!("no backups for {}", args.instance);
            } else {
                for name in &names {
                    println!("{name}");
                }
            }
        }
    }
    Ok(())
}
