//! Settings structures for the ChatNoir front end

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Main settings structure, mirrors `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub outgoing: OutgoingSettings,
    pub search: SearchSettings,
    pub session: SessionSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (CHATNOIR_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("CHATNOIR_BACKEND_ADDRESS") {
            self.backend.address = val;
        }
        if let Ok(val) = std::env::var("CHATNOIR_API_BACKEND_ADDRESS") {
            self.backend.api_address = val;
        }
        if let Ok(val) = std::env::var("CHATNOIR_DEV_MODE") {
            match parse_flag(&val) {
                Some(flag) => self.backend.dev_mode = flag,
                None => warn!("Ignoring CHATNOIR_DEV_MODE={:?}, expected true or false", val),
            }
        }
        if let Ok(val) = std::env::var("CHATNOIR_SEARCH_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                self.outgoing.search_timeout = secs;
            }
        }
    }

    /// URL of the token issuance endpoint (`<backend>?init`)
    pub fn init_url(&self) -> String {
        format!("{}?init", self.backend.address)
    }

    /// URL of the search endpoint (`<api>_search`)
    pub fn search_url(&self) -> String {
        format!("{}_search", self.backend.api_address)
    }
}

/// Boolean environment value: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Addresses of the remote front end and API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Front end backend address, issues tokens and CSRF cookies
    pub address: String,
    /// Search API base address
    pub api_address: String,
    /// Fetch the CSRF cookie from the backend before the first request
    pub dev_mode: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            address: "http://localhost:8000/".to_string(),
            api_address: "http://localhost:8000/api/v1/".to_string(),
            dev_mode: false,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Deadline for search requests in seconds
    pub search_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send with every request
    pub extra_headers: HashMap<String, String>,
}

impl OutgoingSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout.max(0.0))
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.search_timeout.max(0.0))
    }
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            search_timeout: 30.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Search model defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results per page
    pub page_size: u32,
    /// Ask the API for extended result metadata
    pub extended_meta: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            extended_meta: true,
        }
    }
}

/// API token bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Refresh a token this many seconds before it expires
    pub refresh_margin: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            refresh_margin: 20.0,
        }
    }
}
