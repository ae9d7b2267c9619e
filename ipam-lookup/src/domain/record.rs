use serde::{Deserialize, Serialize};

use super::{AddressInfo, NetworkInfo};

/// Flat result of one lookup. Field order is the JSON key order on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddressRecord {
    pub ip_address: String,
    pub network: Option<String>,
    pub network_comment: Option<String>,
    pub hostname: Option<String>,
    pub fqdn: Option<String>,
    pub mac_address: Option<String>,
    pub status: Option<String>,
    pub lease_state: Option<String>,
    pub usage: Vec<String>,
    pub types: Vec<String>,
}

impl ResolvedAddressRecord {
    pub fn merge(ip_address: impl Into<String>, network: NetworkInfo, address: AddressInfo) -> Self {
        Self {
            ip_address: ip_address.into(),
            hostname: address.hostname().map(ToString::to_string),
            fqdn: address.fqdn().map(ToString::to_string),
            network: network.network,
            network_comment: network.comment,
            mac_address: address.mac_address,
            status: address.status,
            lease_state: address.lease_state,
            usage: address.usage,
            types: address.types,
        }
    }

    /// Single-line JSON as written to stdout.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
