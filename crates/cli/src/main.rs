//! kgsm - Krystal Game Server Manager command surface (§6).

mod commands;
mod exit_error;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kgsm_engine::Context;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kgsm", version, about = "Krystal Game Server Manager")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    /// Raise the log level to debug.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new instance directory and registry entry from a blueprint.
    Create(commands::create::CreateArgs),
    /// Download and deploy an instance's files.
    Install(commands::lifecycle::InstanceArgs),
    /// Remove an instance's files, artifacts, and registry entry.
    Uninstall(commands::lifecycle::InstanceArgs),
    /// Start an instance.
    Start(commands::lifecycle::InstanceArgs),
    /// Stop an instance.
    Stop(commands::lifecycle::InstanceArgs),
    /// Stop then start an instance.
    Restart(commands::lifecycle::InstanceArgs),
    /// Report an instance's liveness and metadata.
    Status(commands::lifecycle::InstanceArgs),
    /// Probe for a newer version and, if found, redeploy.
    Update(commands::update::UpdateArgs),
    /// Enable or disable a host integration for an instance.
    Modify(commands::modify::ModifyArgs),
    /// Create a backup of an instance's installed files.
    CreateBackup(commands::backup::CreateBackupArgs),
    /// Restore an instance from a backup.
    RestoreBackup(commands::backup::RestoreBackupArgs),
    /// List an instance's backups.
    ListBackups(commands::backup::ListBackupsArgs),
    /// List known instances.
    Instances(commands::instances::InstancesArgs),
    /// List or inspect known blueprints.
    Blueprints(commands::blueprints::BlueprintsArgs),
    /// Read or write process-wide settings.
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommand,
    },
    /// Diagnose or manually drive the event transports.
    Events(commands::events::EventsArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {msg}");
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain: `ExitError`'s `Display`
/// already renders the underlying `KgsmError`, so a redundant source chain
/// is dropped rather than printed twice.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {i}: {cause}"));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::load()?;
    let _log_guard = logging::init(&ctx.root, cli.verbose)?;
    let format = cli.output;

    match cli.command {
        Commands::Create(args) => commands::create::handle(args, &ctx, format).await,
        Commands::Install(args) => commands::lifecycle::install(args, &ctx, format).await,
        Commands::Uninstall(args) => commands::lifecycle::uninstall(args, &ctx, format).await,
        Commands::Start(args) => commands::lifecycle::start(args, &ctx, format).await,
        Commands::Stop(args) => commands::lifecycle::stop(args, &ctx, format).await,
        Commands::Restart(args) => commands::lifecycle::restart(args, &ctx, format).await,
        Commands::Status(args) => commands::lifecycle::status(args, &ctx, format).await,
        Commands::Update(args) => commands::update::handle(args, &ctx, format).await,
        Commands::Modify(args) => commands::modify::handle(args, &ctx, format).await,
        Commands::CreateBackup(args) => commands::backup::create(args, &ctx, format).await,
        Commands::RestoreBackup(args) => commands::backup::restore(args, &ctx, format).await,
        Commands::ListBackups(args) => commands::backup::list(args, &ctx, format).await,
        Commands::Instances(args) => commands::instances::list(args, &ctx, format).await,
        Commands::Blueprints(args) => commands::blueprints::handle(args, &ctx, format).await,
        Commands::Config { command } => commands::config::handle(command, &ctx, format).await,
        Commands::Events(args) => commands::events::handle(args, &ctx, format).await,
    }
}
