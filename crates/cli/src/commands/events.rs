//! `kgsm events <--status|--emit <payload>|--socket …|--webhook …>` (§6,
//! §4.6). This verb talks to the transports directly rather than through
//! [`kgsm_engine::Orchestrator`] — it is an operator diagnostic for testing
//! event consumers, not an instance-lifecycle action.

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Args;
use kgsm_adapters::{
    parse_webhook_urls, RealSocketTransport, RealWebhookTransport, SocketTransport, WebhookConfig, WebhookTransport,
};
use kgsm_engine::Context;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Print whether socket/webhook broadcasting is enabled and where events
    /// would be sent.
    #[arg(long)]
    pub status: bool,

    /// Send a raw JSON payload to the configured transports (or the
    /// overrides below) instead of waiting for a lifecycle event.
    #[arg(long, value_name = "JSON")]
    pub emit: Option<String>,

    /// Override the socket path `--emit` sends to.
    #[arg(long, value_name = "PATH")]
    pub socket: Option<String>,

    /// Override the webhook URL `--emit` sends to.
    #[arg(long, value_name = "URL")]
    pub webhook: Option<String>,
}

pub async fn handle(args: EventsArgs, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    if let Some(payload) = args.emit {
        return emit(&args.socket, &args.webhook, &payload, ctx, format).await;
    }

    status(ctx, format)
}

fn status(ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let broadcasting = ctx.setting_bool("enable_event_broadcasting");
    let webhooks = ctx.setting_bool("enable_webhook_events");
    let socket_path = ctx.event_socket_path().display().to_string();
    let webhook_urls = ctx.setting_string("webhook_urls");

    #[derive(serde::Serialize)]
    struct Status {
        broadcasting_enabled: bool,
        webhooks_enabled: bool,
        socket_path: String,
        webhook_urls: String,
    }

    let s = Status {
        broadcasting_enabled: broadcasting,
        webhooks_enabled: webhooks,
        socket_path,
        webhook_urls,
    };

    render(format, &s, |s| {
        format!(
            "broadcasting={} webhooks={} socket={} webhook_urls={}",
            s.broadcasting_enabled, s.webhooks_enabled, s.socket_path, s.webhook_urls
        )
    })
}

async fn emit(
    socket_override: &Option<String>,
    webhook_override: &Option<String>,
    payload: &str,
    ctx: &Context,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut sent_to = Vec::new();

    let socket_path = socket_override
        .as_ref()
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| ctx.event_socket_path());
    if socket_override.is_some() || ctx.setting_bool("enable_event_broadcasting") {
        RealSocketTransport
            .send_line(&socket_path, payload)
            .await
            .map_err(ExitError::from)?;
        sent_to.push(socket_path.display().to_string());
    }

    let webhook_urls: Vec<String> = match webhook_override {
        Some(url) => vec![url.clone()],
        None if ctx.setting_bool("enable_webhook_events") => parse_webhook_urls(&ctx.setting_string("webhook_urls")),
        None => Vec::new(),
    };

    if !webhook_urls.is_empty() {
        let config = WebhookConfig {
            timeout: Duration::from_secs(ctx.setting_u64("webhook_timeout_seconds")),
            retry_count: ctx.setting_u64("webhook_retry_count") as u32,
            secret: ctx.setting_string("webhook_secret"),
            kgsm_version: ctx.kgsm_version.clone(),
        };
        for url in &webhook_urls {
            RealWebhookTransport::default()
                .post(url, payload, &config)
                .await
                .map_err(ExitError::from)?;
            sent_to.push(url.clone());
        }
    }

    render(format, &sent_to, |targets| {
        if targets.is_empty() {
            "no transports configured".to_string()
        } else {
            format!("emitted to: {}", targets.join(", "))
        }
    })
}
