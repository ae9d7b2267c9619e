pub mod address;
pub mod network;
pub mod record;

pub use address::{AddressInfo, parse_ipv4};
pub use network::NetworkInfo;
pub use record::ResolvedAddressRecord;

use serde::{Deserialize, Deserializer};

/// WAPI occasionally sends `null` where a list is expected.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
