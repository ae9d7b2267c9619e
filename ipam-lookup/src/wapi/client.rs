use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::net::TcpStream;
use tracing::Level;

use super::retry::{RetryPolicy, retry_after};
use crate::config::{Config, LookupConfig, ProbeConfig, RegistryConfig};
use crate::domain::{AddressInfo, NetworkInfo};
use crate::error::{IpamLookupError, Result};
use crate::ports::RegistryClient;

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One HTTP client and its retry policy.
struct Lookup {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl Lookup {
    fn new(config: &LookupConfig, verify_tls: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .danger_accept_invalid_certs(!verify_tls)
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            retry: RetryPolicy::from(&config.retry),
        })
    }
}

/// [`RegistryClient`] speaking Infoblox WAPI over HTTPS with Basic auth.
///
/// The containment lookup and the address lookup each get their own client,
/// so timeouts, pooling and retries are configured per endpoint.
pub struct WapiClient {
    base_url: Url,
    credentials: Credentials,
    probe: ProbeConfig,
    network: Lookup,
    address: Lookup,
}

impl WapiClient {
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self> {
        let base_url = parse_base_url(&config.registry.base_url)?;
        let verify_tls = config.registry.verifies_tls();

        match tls_notice(&config.registry, &base_url) {
            Some(level) if level == Level::WARN => tracing::warn!(
                base_url = %base_url,
                "TLS certificate verification is disabled; set registry.verify_tls to true, or to false to keep it off"
            ),
            Some(_) => tracing::info!(
                base_url = %base_url,
                "TLS certificate verification is disabled (registry.verify_tls = false)"
            ),
            None => {}
        }

        Ok(Self {
            base_url,
            credentials,
            probe: config.probe.clone(),
            network: Lookup::new(&config.network_lookup, verify_tls)?,
            address: Lookup::new(&config.address_lookup, verify_tls)?,
        })
    }

    /// `{base}/{object}?{key}={ip}`
    pub fn object_url(&self, object: &str, key: &str, ip: Ipv4Addr) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{object}", self.base_url.as_str().trim_end_matches('/')))
            .map_err(|e| IpamLookupError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair(key, &ip.to_string());
        Ok(url)
    }

    fn probe_target(&self) -> Result<(String, u16)> {
        let host = self
            .base_url
            .host_str()
            .ok_or_else(|| IpamLookupError::InvalidBaseUrl(self.base_url.to_string()))?;
        let port = self
            .base_url
            .port_or_known_default()
            .ok_or_else(|| IpamLookupError::InvalidBaseUrl(self.base_url.to_string()))?;
        Ok((host.trim_start_matches('[').trim_end_matches(']').to_string(), port))
    }

    /// One GET, body included, so a connection dropped mid-response counts
    /// as a failed attempt.
    async fn attempt(&self, lookup: &Lookup, url: &Url) -> reqwest::Result<Answer> {
        let response = lookup
            .http
            .get(url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Answer {
            status,
            headers,
            body,
        })
    }

    async fn send(&self, lookup: &Lookup, url: &Url) -> Result<Answer> {
        let mut failures: u32 = 0;

        loop {
            let attempt = failures + 1;
            tracing::debug!(url = %url, attempt, "GET");

            let delay = match self.attempt(lookup, url).await {
                Ok(answer) => {
                    let has_retry_after = retry_after(&answer.headers).is_some();
                    if !lookup.retry.is_retryable(answer.status, has_retry_after) {
                        return Ok(answer);
                    }
                    if failures >= lookup.retry.max_retries() {
                        return Err(IpamLookupError::RetriesExhausted {
                            url: url.to_string(),
                            status: answer.status.as_u16(),
                            attempts: attempt,
                        });
                    }
                    failures += 1;
                    lookup.retry.delay(failures, &answer.headers)
                }
                Err(err) if is_transient(&err) && failures < lookup.retry.max_retries() => {
                    tracing::debug!(url = %url, attempt, error = %err, "transport error");
                    failures += 1;
                    lookup.retry.backoff(failures)
                }
                Err(err) => return Err(err.into()),
            };

            tracing::debug!(url = %url, attempt, delay = ?delay, "retrying");
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, lookup: &Lookup, url: Url) -> Result<Vec<T>> {
        let answer = self.send(lookup, &url).await?;
        tracing::debug!(url = %url, status = answer.status.as_u16(), "response");

        if answer.status != StatusCode::OK {
            return Err(IpamLookupError::UnexpectedStatus {
                url: url.to_string(),
                status: answer.status.as_u16(),
            });
        }

        Ok(serde_json::from_slice(&answer.body)?)
    }
}

struct Answer {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Connect, timeout, request and body failures are retried; builder and
/// redirect errors are not.
fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() || err.is_decode()
}

#[async_trait]
impl RegistryClient for WapiClient {
    async fn probe(&self) -> Result<()> {
        if !self.probe.enabled {
            return Ok(());
        }

        let (host, port) = self.probe_target()?;
        let connected =
            tokio::time::timeout(self.probe.timeout(), TcpStream::connect((host.as_str(), port)))
                .await;

        match connected {
            Ok(Ok(stream)) => {
                drop(stream);
                tracing::debug!(host = %host, port, "registry reachable");
                Ok(())
            }
            Ok(Err(source)) => Err(IpamLookupError::Unreachable { host, port, source }),
            Err(_) => Err(IpamLookupError::ProbeTimeout { host, port }),
        }
    }

    async fn networks_containing(&self, ip: Ipv4Addr) -> Result<Vec<NetworkInfo>> {
        let url = self.object_url("network", "contains_address", ip)?;
        self.fetch_list(&self.network, url).await
    }

    async fn address_records(&self, ip: Ipv4Addr) -> Result<Vec<AddressInfo>> {
        let url = self.object_url("ipv4address", "ip_address", ip)?;
        self.fetch_list(&self.address, url).await
    }
}

/// Unverified HTTPS is a warning unless the config opted out explicitly.
fn tls_notice(registry: &RegistryConfig, base_url: &Url) -> Option<Level> {
    if registry.verifies_tls() || base_url.scheme() != "https" {
        return None;
    }
    if registry.verify_tls.is_some() {
        Some(Level::INFO)
    } else {
        Some(Level::WARN)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| IpamLookupError::InvalidBaseUrl(format!("{raw}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(IpamLookupError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}
