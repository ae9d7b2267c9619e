//! Infoblox WAPI transport: an authenticated reqwest client per lookup,
//! plus the retry policy applied to the containment lookup.

pub mod client;
pub mod retry;

pub use client::{Credentials, WapiClient};
pub use retry::RetryPolicy;
