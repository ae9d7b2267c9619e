//! # ipam-lookup
//!
//! Resolves network and host metadata for a single IPv4 address from an
//! Infoblox WAPI registry.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ipam_lookup::config::Config;
//! use ipam_lookup::services::ResolverService;
//! use ipam_lookup::wapi::{Credentials, WapiClient};
//!
//! # async fn run() -> ipam_lookup::Result<()> {
//! let config = Config::load()?;
//! let client = WapiClient::new(&config, Credentials::new("reader", "secret"))?;
//! let resolver = ResolverService::new(Arc::new(client));
//!
//! let record = resolver.try_resolve("10.0.0.5").await?;
//! println!("{}", record.to_json_line()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod wapi;

pub use error::{IpamLookupError, Result};
