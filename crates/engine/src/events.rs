//! The Event Dispatcher (§4.6): builds the canonical envelope and fans it
//! out to every configured transport. A transport failure never aborts
//! orchestration — delivery is best-effort (§8 boundary behaviors).

use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::webhook::parse_webhook_urls;
use kgsm_adapters::{SocketTransport, WebhookConfig, WebhookTransport};
use kgsm_core::clock::Clock;
use kgsm_core::event::{Envelope, EventData, EventType};
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct EventDispatcher<S: SocketTransport, W: WebhookTransport> {
    socket: S,
    webhook: W,
}

impl<S: SocketTransport, W: WebhookTransport> EventDispatcher<S, W> {
    pub fn new(socket: S, webhook: W) -> Self {
        EventDispatcher { socket, webhook }
    }

    pub async fn emit<C: Clock>(
        &self,
        ctx: &Context<C>,
        event_type: EventType,
        data: EventData,
    ) -> Result<(), EngineError> {
        let hostname = hostname();
        let envelope = Envelope::new(
            event_type,
            data,
            ctx.clock.now_rfc3339(),
            hostname,
            ctx.kgsm_version.clone(),
        )
        .map_err(|e| EngineError::Envelope(e.to_string()))?;

        if ctx.setting_bool("enable_event_broadcasting") {
            let line = envelope.to_ndjson_line().map_err(|e| EngineError::Envelope(e.to_string()))?;
            let socket_path = ctx.event_socket_path();
            if let Err(e) = self.socket.send_line(&socket_path, &line).await {
                warn!(event = ?envelope.event_type, error = %e, "event socket delivery failed");
            }
        }

        if ctx.setting_bool("enable_webhook_events") {
            self.fan_out_webhooks(ctx, &envelope).await;
        }

        Ok(())
    }

    async fn fan_out_webhooks<C: Clock>(&self, ctx: &Context<C>, envelope: &Envelope) {
        let urls = parse_webhook_urls(&ctx.setting_string("webhook_urls"));
        if urls.is_empty() {
            return;
        }

        let payload = match serde_json::to_string(envelope) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "failed to serialize event for webhook delivery");
                return;
            }
        };

        let config = WebhookConfig {
            timeout: Duration::from_secs(ctx.setting_u64("webhook_timeout_seconds")),
            retry_count: ctx.setting_u64("webhook_retry_count").max(1).min(10) as u32,
            secret: ctx.setting_string("webhook_secret"),
            kgsm_version: ctx.kgsm_version.clone(),
        };

        let mut set = tokio::task::JoinSet::new();
        for url in &urls {
            let webhook = self.webhook.clone();
            let url = url.clone();
            let payload = payload.clone();
            let config = config.clone();
            set.spawn(async move {
                let result = webhook.post(&url, &payload, &config).await;
                (url, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((url, Err(e))) => warn!(url, error = %e, "webhook delivery failed after retries"),
                Ok((_, Ok(()))) => {}
                Err(e) => warn!(error = %e, "webhook delivery task panicked"),
            }
        }
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| {
            hostname_from_proc().ok()
        })
        .unwrap_or_else(|| "unknown-host".to_string())
}

fn hostname_from_proc() -> Result<String, std::io::Error> {
    std::fs::read_to_string("/proc/sys/kernel/hostname").map(|s| s.trim().to_string())
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
