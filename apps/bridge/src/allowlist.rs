//! Source-IP gating for the device event webhook.

use ipnetwork::IpNetwork;
use std::net::IpAddr;
use tracing::warn;

/// CIDR allow-list. An empty list admits everyone, which is the development
/// default; production deployments configure the VPN subnet.
#[derive(Debug, Clone, Default)]
pub struct IpAllowlist {
    networks: Vec<IpNetwork>,
}

impl IpAllowlist {
    /// Parse CIDR strings (bare addresses count as /32 or /128). Invalid
    /// entries are logged and skipped rather than taking the service down.
    #[must_use]
    pub fn from_entries(entries: &[String]) -> Self {
        let networks = entries
            .iter()
            .filter_map(|entry| match entry.parse::<IpNetwork>() {
                Ok(network) => Some(network),
                Err(err) => {
                    warn!(entry = %entry, error = %err, "ignoring invalid allow-list entry");
                    None
                }
            })
            .collect();
        Self { networks }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    #[must_use]
    pub fn allows(&self, ip: IpAddr) -> bool {
        self.networks.is_empty() || self.networks.iter().any(|network| network.contains(ip))
    }
}
