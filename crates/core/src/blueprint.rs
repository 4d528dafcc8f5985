//! The blueprint data model (§3). Blueprints are immutable, shared-read
//! templates; parsing them from `.bp`/compose files lives in
//! `kgsm-blueprint`, not here — this module only holds the shape.

use crate::port_spec::{self, PortRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    Native,
    Container,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub name: String,
    pub runtime: Runtime,
    /// Canonical UFW-grammar port spec (§6). For container blueprints this
    /// is derived from `compose_ports` rather than authored directly.
    pub ports: String,
    pub executable_file: String,
    pub executable_subdirectory: String,
    /// Opaque string with deferred variable interpolation (§9 open
    /// question) — never interpolated inside `kgsm-core`.
    pub executable_arguments: String,
    pub level_name: String,
    pub stop_command: String,
    pub save_command: String,
    pub steam_app_id: Option<u32>,
    pub is_steam_account_required: bool,
    pub platform: String,
    /// Set only for `Runtime::Container` blueprints; the raw `ports:`
    /// entries from the compose descriptor, kept alongside the derived
    /// `ports` field so the source is traceable.
    pub compose_ports: Vec<String>,
}

impl Blueprint {
    /// Parsed port ranges for this blueprint, per §6's UFW grammar.
    pub fn port_ranges(&self) -> Result<Vec<PortRange>, port_spec::PortSpecError> {
        port_spec::parse_ufw_spec(&self.ports)
    }

    /// For container blueprints, derive the canonical `ports` string from
    /// `compose_ports` (§3 "Container blueprints additionally carry a
    /// compose-style descriptor from which ports are parsed").
    pub fn derive_ports_from_compose(&mut self) -> Result<(), port_spec::PortSpecError> {
        self.ports = port_spec::compose_ports_to_ufw_spec(&self.compose_ports)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "blueprint_tests.rs"]
mod tests;
