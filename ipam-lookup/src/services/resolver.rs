use std::sync::Arc;

use crate::domain::{AddressInfo, NetworkInfo, ResolvedAddressRecord, parse_ipv4};
use crate::error::Result;
use crate::ports::RegistryClient;

pub struct ResolverService<C: RegistryClient> {
    client: Arc<C>,
}

impl<C: RegistryClient> ResolverService<C> {
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Validates `ip_address`, then probes, looks up the containing network
    /// and the address record, strictly in that order.
    pub async fn try_resolve(&self, ip_address: &str) -> Result<ResolvedAddressRecord> {
        let ip = parse_ipv4(ip_address)?;

        self.client.probe().await?;

        let networks = self.client.networks_containing(ip).await?;
        let network = NetworkInfo::first_or_default(networks);
        tracing::debug!(ip = %ip, network = ?network.network, "network lookup done");

        let records = self.client.address_records(ip).await?;
        let address = AddressInfo::first_or_not_found(records);
        tracing::debug!(ip = %ip, status = ?address.status, "address lookup done");

        Ok(ResolvedAddressRecord::merge(ip_address, network, address))
    }

    /// Same as [`Self::try_resolve`] with every failure collapsed into `None`.
    pub async fn resolve(&self, ip_address: &str) -> Option<ResolvedAddressRecord> {
        self.try_resolve(ip_address).await.ok()
    }
}
