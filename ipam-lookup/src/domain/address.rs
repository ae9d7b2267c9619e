use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::{IpamLookupError, Result};

pub const NOT_FOUND_STATUS: &str = "NOT_FOUND";

/// Accepts strict dotted-quad notation only; shorthand forms such as `127.1`
/// are rejected.
pub fn parse_ipv4(ip_address: &str) -> Result<Ipv4Addr> {
    ip_address
        .parse::<Ipv4Addr>()
        .map_err(|_| IpamLookupError::InvalidAddress(ip_address.to_string()))
}

/// An `ipv4address` object as returned by `GET /ipv4address?ip_address=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub names: Vec<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub lease_state: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub usage: Vec<String>,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub types: Vec<String>,
}

impl AddressInfo {
    /// Stand-in used when the registry has no record for the address.
    pub fn not_found() -> Self {
        Self {
            names: Vec::new(),
            mac_address: None,
            status: Some(NOT_FOUND_STATUS.to_string()),
            lease_state: None,
            usage: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn first_or_not_found(items: Vec<Self>) -> Self {
        items.into_iter().next().unwrap_or_else(Self::not_found)
    }

    pub fn hostname(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// With a single name the hostname doubles as the FQDN; otherwise the
    /// second name is used.
    pub fn fqdn(&self) -> Option<&str> {
        match self.names.as_slice() {
            [] => None,
            [only] => Some(only.as_str()),
            [_, second, ..] => Some(second.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_names(names: &[&str]) -> AddressInfo {
        AddressInfo {
            names: names.iter().map(ToString::to_string).collect(),
            ..AddressInfo::not_found()
        }
    }

    #[test]
    fn test_parse_ipv4_accepts_dotted_quad() {
        assert_eq!(parse_ipv4("10.20.30.40").unwrap(), Ipv4Addr::new(10, 20, 30, 40));
    }

    #[test]
    fn test_parse_ipv4_rejects_malformed() {
        for bad in ["999.999.999.999", "10.0.0", "127.1", "host.example.com", "", " 10.0.0.1"] {
            let err = parse_ipv4(bad).unwrap_err();
            assert!(matches!(err, IpamLookupError::InvalidAddress(ref s) if s == bad));
        }
    }

    #[test]
    fn test_single_name_is_hostname_and_fqdn() {
        let info = with_names(&["host1"]);
        assert_eq!(info.hostname(), Some("host1"));
        assert_eq!(info.fqdn(), Some("host1"));
    }

    #[test]
    fn test_two_names_split_hostname_and_fqdn() {
        let info = with_names(&["host1", "host1.example.com"]);
        assert_eq!(info.hostname(), Some("host1"));
        assert_eq!(info.fqdn(), Some("host1.example.com"));
    }

    #[test]
    fn test_no_names() {
        let info = with_names(&[]);
        assert_eq!(info.hostname(), None);
        assert_eq!(info.fqdn(), None);
    }

    #[test]
    fn test_empty_list_yields_not_found() {
        let info = AddressInfo::first_or_not_found(Vec::new());
        assert_eq!(info.status.as_deref(), Some(NOT_FOUND_STATUS));
        assert!(info.mac_address.is_none());
        assert!(info.lease_state.is_none());
        assert!(info.usage.is_empty());
        assert!(info.types.is_empty());
    }

    #[test]
    fn test_parse_address_record() {
        let json = r#"[{
            "_ref": "ipv4address/Li5pcHY0X2FkZHJlc3MkMTAuMC4wLjUvMA:10.0.0.5",
            "ip_address": "10.0.0.5",
            "is_conflict": false,
            "lease_state": "ACTIVE",
            "mac_address": "00:50:56:aa:bb:cc",
            "names": ["printer-3f", "printer-3f.corp.example.com"],
            "network": "10.0.0.0/24",
            "network_view": "default",
            "objects": [],
            "status": "USED",
            "types": ["HOST", "A"],
            "usage": ["DNS", "DHCP"]
        }]"#;
        let items: Vec<AddressInfo> = serde_json::from_str(json).unwrap();
        let info = AddressInfo::first_or_not_found(items);
        assert_eq!(info.status.as_deref(), Some("USED"));
        assert_eq!(info.lease_state.as_deref(), Some("ACTIVE"));
        assert_eq!(info.mac_address.as_deref(), Some("00:50:56:aa:bb:cc"));
        assert_eq!(info.usage, vec!["DNS", "DHCP"]);
        assert_eq!(info.types, vec!["HOST", "A"]);
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let info: AddressInfo =
            serde_json::from_str(r#"{"names": null, "usage": null, "types": null, "status": "UNUSED"}"#)
                .unwrap();
        assert!(info.names.is_empty());
        assert!(info.usage.is_empty());
        assert!(info.types.is_empty());
        assert_eq!(info.status.as_deref(), Some("UNUSED"));
    }
}
