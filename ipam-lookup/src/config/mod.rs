use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IpamLookupError, Result};

pub const DEFAULT_BASE_URL: &str = "https://ipam.hpicorp.net/wapi/v2.7";
pub const PROJECT_CONFIG_FILE: &str = ".ipam-lookup.toml";
pub const BASE_URL_ENV: &str = "IPAM_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub registry: RegistryConfig,
    pub probe: ProbeConfig,
    pub network_lookup: LookupConfig,
    pub address_lookup: LookupConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub base_url: String,
    /// Certificate validation is off unless enabled here. Leaving it unset
    /// keeps it off but gets reported on every run.
    pub verify_tls: Option<bool>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_tls: None,
        }
    }
}

impl RegistryConfig {
    pub fn verifies_tls(&self) -> bool {
        self.verify_tls.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 5,
        }
    }
}

impl ProbeConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub retry: RetryConfig,
}

impl LookupConfig {
    /// Containment lookup: short timeouts, pooled, retried.
    pub fn network() -> Self {
        Self {
            connect_timeout_secs: 5,
            read_timeout_secs: 15,
            pool_max_idle_per_host: 10,
            retry: RetryConfig::default(),
        }
    }

    /// Address lookup: longer timeouts, unpooled, no retries.
    pub fn address() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
            pool_max_idle_per_host: 0,
            retry: RetryConfig::disabled(),
        }
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 0.1,
            status_forcelist: vec![500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// On-disk shape. Lookup sections only override what they name, on top of
/// that lookup's own defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    registry: RegistryConfig,
    probe: ProbeConfig,
    network_lookup: LookupOverrides,
    address_lookup: LookupOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LookupOverrides {
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    pool_max_idle_per_host: Option<usize>,
    retry: RetryOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RetryOverrides {
    max_retries: Option<u32>,
    backoff_factor: Option<f64>,
    status_forcelist: Option<Vec<u16>>,
}

impl LookupOverrides {
    fn apply(self, base: LookupConfig) -> LookupConfig {
        LookupConfig {
            connect_timeout_secs: self.connect_timeout_secs.unwrap_or(base.connect_timeout_secs),
            read_timeout_secs: self.read_timeout_secs.unwrap_or(base.read_timeout_secs),
            pool_max_idle_per_host: self
                .pool_max_idle_per_host
                .unwrap_or(base.pool_max_idle_per_host),
            retry: RetryConfig {
                max_retries: self.retry.max_retries.unwrap_or(base.retry.max_retries),
                backoff_factor: self.retry.backoff_factor.unwrap_or(base.retry.backoff_factor),
                status_forcelist: self
                    .retry
                    .status_forcelist
                    .unwrap_or(base.retry.status_forcelist),
            },
        }
    }
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        Self {
            registry: file.registry,
            probe: file.probe,
            network_lookup: file.network_lookup.apply(LookupConfig::network()),
            address_lookup: file.address_lookup.apply(LookupConfig::address()),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            registry: RegistryConfig::default(),
            probe: ProbeConfig::default(),
            network_lookup: LookupConfig::network(),
            address_lookup: LookupConfig::address(),
        }
    }

    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project()?;
        let merged = Self::merge(global, project);
        Ok(merged.with_env_overrides())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<ConfigFile>(content)
            .map(Self::from)
            .map_err(|e| IpamLookupError::Config(e.to_string()))
    }

    fn load_global() -> Result<Option<Self>> {
        let config_dir = directories::ProjectDirs::from("", "", "ipam-lookup").map_or_else(
            || PathBuf::from("~/.config/ipam-lookup"),
            |d| d.config_dir().to_path_buf(),
        );

        Self::load_optional(&config_dir.join("config.toml"))
    }

    fn load_project() -> Result<Option<Self>> {
        Self::load_optional(Path::new(PROJECT_CONFIG_FILE))
    }

    fn load_optional(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Self::from_path(path).map(Some)
        } else {
            Ok(None)
        }
    }

    fn merge(global: Option<Self>, project: Option<Self>) -> Self {
        project.or(global).unwrap_or_else(Self::new)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            self.registry.base_url = base_url.trim().to_string();
        }
        self
    }
}
