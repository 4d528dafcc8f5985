//! UPnP integration (§4.4): "Purely a configuration flag toggle plus a
//! pre-computed `upnp_ports[]` array; no host mutation (the management
//! script performs the actual port mapping at start/stop)." This adapter
//! exists to keep the same enable/disable shape as the other integrations
//! even though, today, there is nothing for it to actually mutate on the
//! host — it only validates the port list it's handed.

use crate::error::AdapterError;
use kgsm_core::port_spec::{self, Port};

pub trait UpnpAdapter: Clone + Send + Sync + 'static {
    /// Validate `ufw_spec` and return the flat port list to record as
    /// `upnp_ports[]`.
    fn enable(&self, ufw_spec: &str) -> Result<Vec<Port>, AdapterError>;

    /// No-op: clearing `upnp_ports[]` is the integration manager's job.
    fn disable(&self) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, Default)]
pub struct RealUpnpAdapter;

impl UpnpAdapter for RealUpnpAdapter {
    fn enable(&self, ufw_spec: &str) -> Result<Vec<Port>, AdapterError> {
        let ranges = port_spec::parse_ufw_spec(ufw_spec)
            .map_err(|e| AdapterError::Firewall(e.to_string()))?;
        Ok(port_spec::expand_to_ports(&ranges))
    }

    fn disable(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "upnp_tests.rs"]
mod tests;
