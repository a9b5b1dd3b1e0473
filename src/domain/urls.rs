//! Canonical path and URL construction.
//!
//! Pure functions over a scheme, a hostname and a path fragment. Callers
//! may cache results keyed on (hostname, scheme, request uri).

use super::record::Scheme;

/// Base path used when the caller has none configured.
pub const DEFAULT_BASE_PATH: &str = "/";

/// `scheme://hostname`, with no trailing slash handling.
pub fn raw_path(scheme: Scheme, hostname: &str) -> String {
    format!("{}{}", scheme.with_suffix(), hostname)
}

/// Append a caller-supplied path fragment to the raw path.
///
/// The fragment is used verbatim; normalizing it is up to the caller.
pub fn build_url(scheme: Scheme, hostname: &str, path: &str) -> String {
    let mut url = raw_path(scheme, hostname);
    url.push_str(path);
    url
}

/// Domain base path: raw path followed by the site base path.
pub fn build_path(scheme: Scheme, hostname: &str, base_path: &str) -> String {
    build_url(scheme, hostname, base_path)
}

/// Request-scoped URL: raw path followed by the current request URI.
pub fn request_url(scheme: Scheme, hostname: &str, request_uri: &str) -> String {
    if request_uri.is_empty() {
        return build_path(scheme, hostname, DEFAULT_BASE_PATH);
    }
    build_url(scheme, hostname, request_uri)
}
