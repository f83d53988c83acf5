//! Runtime configuration.
//!
//! The backend base address is the only value read from the environment
//! (`AUDIOCONVERT_BACKEND_URL`). Everything else is policy data with
//! defaults that match the deployed service.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::{Position, Url};

pub const BACKEND_URL_ENV: &str = "AUDIOCONVERT_BACKEND_URL";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:2001";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend url {value:?}: {source}")]
    InvalidBackendUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend url must use http or https, got {0:?}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    base_url: Url,
}

impl BackendConfig {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidBackendUrl {
            value: value.to_string(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        Ok(Self { base_url })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(BACKEND_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value),
            _ => Self::parse(DEFAULT_BACKEND_URL),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Backend URL for the given path segments, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Joins a server-provided download path onto the base address.
    ///
    /// Only the path and query of an absolute URL are kept; downloads always
    /// come from the configured backend.
    pub fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
        let rebased;
        let path = match Url::parse(path) {
            Ok(absolute) if absolute.has_host() => {
                log::warn!("Download link {absolute} names another host; using the backend instead");
                rebased = absolute[Position::BeforePath..].to_string();
                rebased.as_str()
            }
            _ => path,
        };
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))
    }
}

/// Host lists and timing used by validation, classification and progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPolicy {
    pub accepted_hosts: Vec<String>,
    pub video_hosts: Vec<String>,
    pub block_markers: Vec<String>,
    pub tick_interval: Duration,
}

impl Default for ConversionPolicy {
    fn default() -> Self {
        Self {
            accepted_hosts: ["youtube.com", "youtu.be", "soundcloud.com", "spotify.com"]
                .map(String::from)
                .to_vec(),
            video_hosts: ["youtube.com", "youtu.be"].map(String::from).to_vec(),
            block_markers: ["youtube", "bot", "verification"].map(String::from).to_vec(),
            tick_interval: Duration::from_millis(200),
        }
    }
}

impl ConversionPolicy {
    pub fn is_video_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.video_hosts.iter().any(|known| {
            let known = known.to_ascii_lowercase();
            host == known || host.ends_with(&format!(".{known}"))
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub policy: ConversionPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend: BackendConfig::from_env()?,
            policy: ConversionPolicy::default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub backend: BackendConfig,
    pub listen: SocketAddr,
    pub upload_limit: usize,
}

impl ProxyConfig {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const UPLOAD_LIMIT: usize = 100 * 1024 * 1024;

    pub fn new(backend: BackendConfig) -> Self {
        Self {
            backend,
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, Self::DEFAULT_PORT)),
            upload_limit: Self::UPLOAD_LIMIT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(BackendConfig::from_env()?))
    }
}
