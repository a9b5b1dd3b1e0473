//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::domain::{NewDomain, Scheme};

/// Root configuration for the domain router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, TLS flag).
    pub listener: ListenerConfig,

    /// Where domain records are stored.
    pub storage: StorageConfig,

    /// Site base path appended to domain paths.
    pub base_path: String,

    /// Records created at startup when the store is empty.
    pub domains: Vec<DomainSeed>,

    /// Response probe settings.
    pub probe: ProbeConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            storage: StorageConfig::default(),
            base_path: "/".to_string(),
            domains: Vec::new(),
            probe: ProbeConfig::default(),
            timeouts: TimeoutConfig::default(),
            admin: AdminConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whether clients reach the router over TLS (terminated upstream).
    /// Picks the scheme of new records and of requests without
    /// `X-Forwarded-Proto`.
    pub https: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            https: false,
        }
    }
}

/// Storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Record file for the `file` backend.
    pub path: Option<String>,

    /// Reload the registry when the record file changes on disk.
    pub watch: bool,
}

/// A domain record declared in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainSeed {
    pub id: String,
    pub hostname: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scheme: Option<Scheme>,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub redirect: Option<u16>,
    #[serde(default)]
    pub canonical: Option<String>,
}

impl From<DomainSeed> for NewDomain {
    fn from(seed: DomainSeed) -> Self {
        NewDomain {
            id: seed.id,
            hostname: seed.hostname,
            name: seed.name,
            scheme: seed.scheme,
            weight: seed.weight,
            status: seed.status,
            is_default: Some(seed.is_default),
            redirect: seed.redirect,
            canonical: seed.canonical,
        }
    }
}

/// Response probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Enable lazy HTTP probing of domains.
    pub enabled: bool,

    /// Probe timeout in seconds.
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

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

/// Placeholder key rejected by validation when the admin API is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
