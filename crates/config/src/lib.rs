//! kgsm-config: the Config Store (§4.1) — the only writer of on-disk
//! `key=value` documents, whether process-wide settings or per-instance
//! config files.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod document;
pub mod error;
pub mod settings;
pub mod store;

pub use document::{ConfigDocument, Value};
pub use error::ConfigError;
pub use store::{instance_config_path, ConfigStore, ConfigWriter, FsConfigWriter};
