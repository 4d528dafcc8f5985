//! The Readiness Watcher (§4.9): waits for an instance to signal it has
//! finished starting, via either a log-pattern match or a bound-port probe.
//! Bounded by `watcher_timeout_seconds` and gives up early if the underlying
//! process disappears.

use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::logtail::latest_log_file;
use kgsm_adapters::{LogTailer, ProcessAdapter};
use kgsm_core::clock::Clock;
use kgsm_core::instance::Instance;
use kgsm_core::port_spec::{Port, Protocol};
use regex::Regex;
use std::time::Duration;

const PORT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const LOG_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub enum ReadinessStrategy {
    LogPattern(Regex),
    PortProbe(Port),
}

#[derive(Clone)]
pub struct ReadinessWatcher<L: LogTailer, P: ProcessAdapter> {
    log_tailer: L,
    process: P,
}

impl<L: LogTailer, P: ProcessAdapter> ReadinessWatcher<L, P> {
    pub fn new(log_tailer: L, process: P) -> Self {
        ReadinessWatcher { log_tailer, process }
    }

    pub async fn wait_ready<C: Clock>(
        &self,
        ctx: &Context<C>,
        instance: &Instance,
        strategy: &ReadinessStrategy,
    ) -> Result<bool, EngineError> {
        let timeout = Duration::from_secs(ctx.watcher_timeout_seconds());
        match strategy {
            ReadinessStrategy::LogPattern(pattern) => self.wait_for_log_pattern(instance, pattern, timeout).await,
            ReadinessStrategy::PortProbe(port) => self.wait_for_bound_port(instance, *port, timeout).await,
        }
    }

    async fn wait_for_log_pattern(
        &self,
        instance: &Instance,
        pattern: &Regex,
        timeout: Duration,
    ) -> Result<bool, EngineError> {
        let Some(log_file) = latest_log_file(&instance.logs_dir())? else {
            return Ok(false);
        };

        let tailer = self.log_tailer.clone();
        let pattern = pattern.clone();
        let matched = tokio::task::spawn_blocking(move || {
            tailer.wait_for_pattern(&log_file, &pattern, LOG_POLL_INTERVAL, timeout)
        })
        .await
        .map_err(|e| EngineError::PhaseFailed {
            instance: instance.name.clone(),
            phase: "watch".to_string(),
            message: format!("log tailer task panicked: {e}"),
        })??;

        Ok(matched)
    }

    async fn wait_for_bound_port(&self, instance: &Instance, port: Port, timeout: Duration) -> Result<bool, EngineError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if !self.process.is_running(&instance.pid_file)? {
                return Ok(false);
            }
            if port_is_bound(port).await {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(PORT_POLL_INTERVAL).await;
        }
    }
}

/// Picks the §4.9 strategy for `instance`: `startup_success_regex` (an
/// optional per-instance config key, not a typed [`Instance`] field) wins
/// when set; otherwise the first port in `ports`, if any. `None` means
/// nothing to watch for — `start` skips the watcher entirely.
pub fn strategy_for<C: Clock>(ctx: &Context<C>, instance: &Instance) -> Result<Option<ReadinessStrategy>, EngineError> {
    let regex = ctx
        .config_store
        .get(&instance.config_file, "startup_success_regex")
        .ok()
        .flatten()
        .and_then(|v| match v {
            kgsm_config::document::Value::Scalar(s) if !s.is_empty() => Some(s),
            _ => None,
        });
    if let Some(pattern) = regex {
        let compiled = Regex::new(&pattern).map_err(|e| EngineError::InvalidArg(format!("invalid startup_success_regex: {e}")))?;
        return Ok(Some(ReadinessStrategy::LogPattern(compiled)));
    }

    if instance.ports.is_empty() {
        return Ok(None);
    }
    let ranges = kgsm_core::port_spec::parse_ufw_spec(&instance.ports)?;
    let port = kgsm_core::port_spec::expand_to_ports(&ranges).into_iter().next();
    Ok(port.map(ReadinessStrategy::PortProbe))
}

async fn port_is_bound(port: Port) -> bool {
    match port.proto {
        Protocol::Tcp => tokio::net::TcpStream::connect(("127.0.0.1", port.port)).await.is_ok(),
        // No listener-side probe exists for UDP; a failed bind on the same
        // port is the closest available signal that something already owns it.
        Protocol::Udp => tokio::net::UdpSocket::bind(("127.0.0.1", port.port)).await.is_err(),
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
