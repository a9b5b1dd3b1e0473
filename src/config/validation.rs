//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, hostnames and seed uniqueness
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{RouterConfig, StorageBackend, PLACEHOLDER_API_KEY};
use crate::domain::hostname;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("domains[{index}]: invalid hostname {hostname:?}")]
    InvalidHostname { index: usize, hostname: String },

    #[error("domains[{index}]: empty id")]
    EmptyId { index: usize },

    #[error("domains[{index}]: duplicate id {id:?}")]
    DuplicateId { index: usize, id: String },

    #[error("domains[{index}]: invalid canonical hostname {canonical:?}")]
    InvalidCanonical { index: usize, canonical: String },

    #[error("domains[{index}]: duplicate hostname {hostname:?}")]
    DuplicateHostname { index: usize, hostname: String },

    #[error("domains: more than one default domain")]
    MultipleDefaults,

    #[error("domains[{index}]: the default domain cannot be disabled")]
    DisabledDefault { index: usize },

    #[error("storage.path is required for the file backend")]
    MissingStoragePath,

    #[error("base_path must start with '/'")]
    InvalidBasePath,

    #[error("admin.api_key must be changed when the admin API is enabled")]
    PlaceholderApiKey,

    #[error("probe.timeout_secs must be greater than zero")]
    ZeroProbeTimeout,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key == PLACEHOLDER_API_KEY || config.admin.api_key.is_empty() {
            errors.push(ValidationError::PlaceholderApiKey);
        }
    }
    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if config.storage.backend == StorageBackend::File && config.storage.path.is_none() {
        errors.push(ValidationError::MissingStoragePath);
    }
    if !config.base_path.starts_with('/') {
        errors.push(ValidationError::InvalidBasePath);
    }
    if config.probe.enabled && config.probe.timeout_secs == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }

    let mut ids = HashSet::new();
    let mut hosts = HashSet::new();
    let mut defaults = 0;
    for (index, seed) in config.domains.iter().enumerate() {
        if seed.id.is_empty() {
            errors.push(ValidationError::EmptyId { index });
        } else if !ids.insert(seed.id.as_str()) {
            errors.push(ValidationError::DuplicateId { index, id: seed.id.clone() });
        }

        if hostname::validate(&seed.hostname).is_err() {
            errors.push(ValidationError::InvalidHostname { index, hostname: seed.hostname.clone() });
        } else if !hosts.insert(hostname::normalize(&seed.hostname)) {
            errors.push(ValidationError::DuplicateHostname { index, hostname: seed.hostname.clone() });
        }

        if let Some(canonical) = &seed.canonical {
            if hostname::validate_canonical(canonical).is_err() {
                errors.push(ValidationError::InvalidCanonical { index, canonical: canonical.clone() });
            }
        }

        if seed.is_default {
            defaults += 1;
            if seed.status == Some(false) {
                errors.push(ValidationError::DisabledDefault { index });
            }
        }
    }
    if defaults > 1 {
        errors.push(ValidationError::MultipleDefaults);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress { field, value: value.to_string() });
    }
}
