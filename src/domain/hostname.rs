//! Hostname normalization and validation.
//!
//! # Design Decisions
//! - Hostnames are stored as entered; comparisons use the lowercase form
//! - A port suffix (`host:port`) is part of the hostname
//! - A leading `*.` marks a wildcard record matching any subdomain

use url::Url;

use crate::error::DomainError;

/// Prefix marking a wildcard hostname.
pub const WILDCARD_PREFIX: &str = "*.";

/// Lowercase form used for every hostname comparison.
pub fn normalize(hostname: &str) -> String {
    hostname.trim().to_ascii_lowercase()
}

/// Returns the `:port` suffix of a hostname, or an empty string.
pub fn port(hostname: &str) -> &str {
    match hostname.rfind(':') {
        Some(idx) if !hostname.ends_with(']') => &hostname[idx..],
        _ => "",
    }
}

/// Returns the suffix a wildcard hostname matches (`*.example.com` → `example.com`).
pub fn wildcard_suffix(hostname: &str) -> Option<&str> {
    hostname.strip_prefix(WILDCARD_PREFIX)
}

/// Check that a hostname is a bare `host[:port]`, optionally wildcarded.
pub fn validate(hostname: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::InvalidHostname(hostname.to_string());

    let bare = wildcard_suffix(hostname).unwrap_or(hostname);
    if bare.is_empty() || bare.chars().any(|c| c.is_whitespace() || "/?#@*".contains(c)) {
        return Err(invalid());
    }

    let parsed = Url::parse(&format!("http://{}", bare)).map_err(|_| invalid())?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid());
    }

    // Url drops the default port, so check explicit ports by hand.
    let port = port(bare);
    if !port.is_empty() && port[1..].parse::<u16>().is_err() {
        return Err(invalid());
    }

    Ok(())
}

/// Check a canonical hostname: a valid `host[:port]` that is not a wildcard.
pub fn validate_canonical(hostname: &str) -> Result<(), DomainError> {
    if wildcard_suffix(hostname).is_some() {
        return Err(DomainError::InvalidHostname(hostname.to_string()));
    }
    validate(hostname)
}
