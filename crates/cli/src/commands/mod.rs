//! One module per verb family, each a thin `anyhow`-wrapped call into
//! `kgsm-engine`. Every fallible engine/config/blueprint call goes through
//! [`crate::exit_error::ExitError`] so the terminal exit code (§6) survives
//! the trip through `anyhow::Error`.

pub mod backup;
pub mod blueprints;
pub mod config;
pub mod create;
pub mod events;
pub mod instances;
pub mod lifecycle;
pub mod modify;
pub mod update;

use kgsm_adapters::{
    RealDownloader, RealFirewallAdapter, RealLogTailer, RealProcessAdapter, RealShortcutAdapter,
    RealSocketTransport, RealSystemdAdapter, RealUpnpAdapter, RealWebhookTransport,
};
use kgsm_blueprint::BlueprintResolver;
use kgsm_engine::{Context, RealOrchestrator};

/// Wires every adapter to its `Real*` implementation, the production
/// counterpart to each orchestrator test file's local fake-backed builder.
pub fn build_orchestrator(ctx: &Context) -> RealOrchestrator {
    RealOrchestrator::new(
        RealProcessAdapter,
        RealSystemdAdapter::new(ctx.elevate_prefix.clone()),
        RealFirewallAdapter::new(ctx.elevate_prefix.clone()),
        RealShortcutAdapter,
        RealUpnpAdapter,
        RealLogTailer,
        RealSocketTransport,
        RealWebhookTransport::default(),
        RealDownloader,
        BlueprintResolver::new(ctx.blueprints_default_dir(), ctx.blueprints_custom_dir()),
    )
}
