use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::domain::{AddressInfo, NetworkInfo};
use crate::error::Result;

/// Read-only view of an IPAM registry.
///
/// Lookups return the raw list the registry answered with; picking the first
/// element and substituting defaults is left to the caller.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Checks that the registry host accepts TCP connections at all.
    async fn probe(&self) -> Result<()>;
    async fn networks_containing(&self, ip: Ipv4Addr) -> Result<Vec<NetworkInfo>>;
    async fn address_records(&self, ip: Ipv4Addr) -> Result<Vec<AddressInfo>>;
}
