//! HTTP webhook transport for the Event Dispatcher (§4.6): per-endpoint
//! retry with exponential backoff, optional HMAC-SHA256 signing.

use crate::error::AdapterError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub timeout: Duration,
    pub retry_count: u32,
    pub secret: String,
    pub kgsm_version: String,
}

fn sign(payload: &str, secret: &str) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

#[async_trait]
pub trait WebhookTransport: Clone + Send + Sync + 'static {
    /// POST `payload` to `url` with §4.6's headers, retrying up to
    /// `config.retry_count` times with exponential backoff (1s, 2s, 4s, …).
    async fn post(&self, url: &str, payload: &str, config: &WebhookConfig) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone)]
pub struct RealWebhookTransport {
    client: reqwest::Client,
}

impl Default for RealWebhookTransport {
    fn default() -> Self {
        RealWebhookTransport {
            client: reqwest::Client::new(),
        }
    }
}

impl RealWebhookTransport {
    async fn attempt(
        &self,
        url: &str,
        payload: &str,
        config: &WebhookConfig,
        attempt: u32,
        unix_seconds: u64,
    ) -> Result<(), AdapterError> {
        let mut req = self
            .client
            .post(url)
            .timeout(config.timeout)
            .header("Content-Type", "application/json")
            .header("User-Agent", format!("KGSM/{}", config.kgsm_version))
            .header("X-KGSM-Timestamp", unix_seconds.to_string())
            .header("X-KGSM-Retry-Count", attempt.to_string())
            .body(payload.to_string());

        if !config.secret.is_empty() {
            req = req.header(
                "X-KGSM-Signature",
                format!("sha256={}", sign(payload, &config.secret)),
            );
        }

        let resp = req
            .send()
            .await
            .map_err(|e| AdapterError::Subprocess {
                description: format!("webhook POST {url}"),
                message: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(AdapterError::Subprocess {
                description: format!("webhook POST {url}"),
                message: format!("HTTP {}", resp.status()),
            })
        }
    }
}

#[async_trait]
impl WebhookTransport for RealWebhookTransport {
    async fn post(&self, url: &str, payload: &str, config: &WebhookConfig) -> Result<(), AdapterError> {
        let unix_seconds = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut last_err = None;
        for attempt in 0..=config.retry_count {
            match self.attempt(url, payload, config, attempt, unix_seconds).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    last_err = Some(e);
                    if attempt < config.retry_count {
                        let backoff = Duration::from_secs(1u64 << attempt);
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }
        Err(last_err.expect("loop runs at least once"))
    }
}

/// Parse `enable_webhook_events`'s comma-separated `webhook_urls` setting
/// (§4.1, §4.6).
pub fn parse_webhook_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWebhookTransport, WebhookCall};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct WebhookCall {
        pub url: String,
        pub payload: String,
    }

    #[derive(Clone, Default)]
    pub struct FakeWebhookTransport {
        pub calls: Arc<Mutex<Vec<WebhookCall>>>,
        pub fail_urls: Arc<Mutex<std::collections::HashSet<String>>>,
    }

    #[async_trait]
    impl WebhookTransport for FakeWebhookTransport {
        async fn post(&self, url: &str, payload: &str, _config: &WebhookConfig) -> Result<(), AdapterError> {
            self.calls.lock().push(WebhookCall {
                url: url.to_string(),
                payload: payload.to_string(),
            });
            if self.fail_urls.lock().contains(url) {
                Err(AdapterError::Subprocess {
                    description: format!("webhook POST {url}"),
                    message: "simulated failure".into(),
                })
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
