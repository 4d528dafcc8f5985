//! Parses the `ports:` entries out of a container blueprint's
//! docker-compose descriptor (§3, §4.2, §6).

use crate::error::BlueprintError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ComposeFile {
    services: HashMap<String, ComposeService>,
}

#[derive(Debug, Deserialize)]
struct ComposeService {
    #[serde(default)]
    ports: Vec<String>,
}

/// KGSM's container blueprints are single-service descriptors — the first
/// (only) service's `ports:` entries are the blueprint's ports.
pub fn parse_compose_ports(yaml: &str) -> Result<Vec<String>, BlueprintError> {
    let file: ComposeFile = serde_yaml::from_str(yaml)?;
    file.services
        .into_values()
        .next()
        .map(|s| s.ports)
        .ok_or(BlueprintError::NoComposeServices)
}

#[cfg(test)]
#[path = "compose_tests.rs"]
mod tests;
