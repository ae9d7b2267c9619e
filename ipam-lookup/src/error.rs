use thiserror::Error;

#[derive(Error, Debug)]
pub enum IpamLookupError {
    #[error("Invalid IP address format: {0}")]
    InvalidAddress(String),

    #[error("Cannot reach registry at {host}:{port}: {source}")]
    Unreachable {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out connecting to registry at {host}:{port}")]
    ProbeTimeout { host: String, port: u16 },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Max retries exceeded with url: {url} (last status {status} after {attempts} attempts)")]
    RetriesExhausted {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("Invalid registry base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IpamLookupError {
    /// Non-200 answers that were not retried produce no diagnostic at all.
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { .. })
    }

    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidBaseUrl(_) | Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, IpamLookupError>;
