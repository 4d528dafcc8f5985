//! kgsm-adapters: every piece of host I/O the engine drives — subprocess
//! execution, systemd, ufw, symlinks, UPnP, the event socket, and webhook
//! delivery. Each adapter is a trait with a real implementation and a
//! fake/no-op implementation for tests.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod download;
pub mod error;
pub mod firewall;
pub mod logtail;
pub mod process;
pub mod socket;
pub mod subprocess;
pub mod symlink;
pub mod systemd;
pub mod upnp;
pub mod webhook;

pub use download::{Downloader, RealDownloader};
pub use error::AdapterError;
pub use firewall::{FirewallAdapter, RealFirewallAdapter};
pub use logtail::{latest_log_file, LogTailer, RealLogTailer};
pub use process::{default_pid_file, ProcessAdapter, RealProcessAdapter};
pub use socket::{RealSocketTransport, SocketTransport};
pub use symlink::{RealShortcutAdapter, ShortcutAdapter};
pub use systemd::{RealSystemdAdapter, SystemdAdapter};
pub use upnp::{RealUpnpAdapter, UpnpAdapter};
pub use webhook::{parse_webhook_urls, RealWebhookTransport, WebhookConfig, WebhookTransport};

#[cfg(any(test, feature = "test-support"))]
pub use download::FakeDownloader;
#[cfg(any(test, feature = "test-support"))]
pub use firewall::FakeFirewallAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use logtail::FakeLogTailer;
#[cfg(any(test, feature = "test-support"))]
pub use process::FakeProcessAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use socket::FakeSocketTransport;
#[cfg(any(test, feature = "test-support"))]
pub use symlink::FakeShortcutAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use systemd::FakeSystemdAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use webhook::FakeWebhookTransport;
