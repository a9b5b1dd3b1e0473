//! The domain record value type.
//!
//! # Responsibilities
//! - Hold one hostname → site mapping and its flags
//! - Derive scheme/path/url/canonical values on demand
//! - Cache derived values until the hostname or scheme changes
//!
//! # Design Decisions
//! - `domain_id` is derived once from `id` and never recomputed
//! - `is_default` and `status` are only writable inside the crate so the
//!   registry stays the single owner of the default invariant
//! - `match_type` and the derived cache are never persisted

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::hostname;
use super::id::derive_domain_id;
use super::urls;

/// URL scheme of a domain record.
///
/// Any stored value other than `https` is read as `http`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    /// Coerce a raw scheme value; anything but `https` becomes `http`.
    pub fn coerce(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("https") {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    /// Default scheme for the ambient TLS state.
    pub fn from_tls(is_https: bool) -> Self {
        if is_https {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Scheme followed by `://`.
    pub fn with_suffix(&self) -> &'static str {
        match self {
            Scheme::Http => "http://",
            Scheme::Https => "https://",
        }
    }
}

impl From<String> for Scheme {
    fn from(raw: String) -> Self {
        Scheme::coerce(&raw)
    }
}

impl From<Scheme> for String {
    fn from(scheme: Scheme) -> Self {
        scheme.as_str().to_string()
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the resolver matched a record to a request hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Not produced by a resolution.
    #[default]
    None,
    Exact,
    Wildcard,
    DefaultFallback,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::None => "none",
            MatchType::Exact => "exact",
            MatchType::Wildcard => "wildcard",
            MatchType::DefaultFallback => "default_fallback",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lazily derived values; reset when their inputs change.
#[derive(Debug, Clone, Default)]
struct DerivedCache {
    path: OnceLock<String>,
    canonical: OnceLock<String>,
}

/// A rendered link to a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainLink {
    pub label: String,
    pub href: String,
}

/// One hostname-to-site mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
    id: String,
    domain_id: u32,
    name: String,
    hostname: String,
    #[serde(default)]
    scheme: Scheme,
    #[serde(default)]
    weight: i32,
    #[serde(default)]
    is_default: bool,
    #[serde(default = "enabled")]
    status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redirect: Option<u16>,

    #[serde(skip)]
    match_type: MatchType,
    #[serde(default, rename = "canonical", skip_serializing_if = "Option::is_none")]
    canonical_override: Option<String>,
    #[serde(skip)]
    cache: DerivedCache,
}

fn enabled() -> bool {
    true
}

impl DomainRecord {
    /// Create a record with default flags. The numeric id is derived here.
    pub fn new(id: impl Into<String>, hostname: impl Into<String>) -> Self {
        let id = id.into();
        let hostname = hostname.into();
        Self {
            domain_id: derive_domain_id(&id),
            name: hostname.clone(),
            id,
            hostname,
            scheme: Scheme::Http,
            weight: 0,
            is_default: false,
            status: true,
            redirect: None,
            match_type: MatchType::None,
            canonical_override: None,
            cache: DerivedCache::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn domain_id(&self) -> u32 {
        self.domain_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Normalized scheme, optionally followed by `://`.
    pub fn get_scheme(&self, with_suffix: bool) -> &'static str {
        if with_suffix {
            self.scheme.with_suffix()
        } else {
            self.scheme.as_str()
        }
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Enabled/disabled status.
    pub fn status(&self) -> bool {
        self.status
    }

    pub fn redirect(&self) -> Option<u16> {
        self.redirect
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn is_https(&self) -> bool {
        self.scheme == Scheme::Https
    }

    pub fn is_wildcard(&self) -> bool {
        hostname::wildcard_suffix(&self.hostname).is_some()
    }

    /// `:port` suffix of the hostname, or empty.
    pub fn port(&self) -> &str {
        hostname::port(&self.hostname)
    }

    /// Whether this record is the one the resolver made active.
    pub fn is_active(&self, active_id: Option<&str>) -> bool {
        active_id == Some(self.id.as_str())
    }

    pub fn raw_path(&self) -> String {
        urls::raw_path(self.scheme, &self.hostname)
    }

    pub fn build_url(&self, path: &str) -> String {
        urls::build_url(self.scheme, &self.hostname, path)
    }

    /// Base path of the domain, cached until hostname or scheme change.
    pub fn path(&self) -> &str {
        self.cache
            .path
            .get_or_init(|| urls::build_path(self.scheme, &self.hostname, urls::DEFAULT_BASE_PATH))
    }

    /// URL of the current request on this domain. Request-scoped, never cached.
    pub fn url(&self, request_uri: &str) -> String {
        urls::request_url(self.scheme, &self.hostname, request_uri)
    }

    /// Display hostname; the stored hostname unless overridden.
    pub fn canonical(&self) -> &str {
        self.cache.canonical.get_or_init(|| {
            self.canonical_override
                .clone()
                .unwrap_or_else(|| self.hostname.clone())
        })
    }

    /// Link labelled with the canonical hostname, pointing at the current
    /// request URL when one is given, else at the domain path.
    pub fn link(&self, request_uri: Option<&str>) -> DomainLink {
        let canonical = self.canonical();
        let href = match request_uri {
            Some(uri) => urls::request_url(self.scheme, canonical, uri),
            None => urls::build_path(self.scheme, canonical, urls::DEFAULT_BASE_PATH),
        };
        DomainLink {
            label: canonical.to_string(),
            href,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_hostname(&mut self, hostname: impl Into<String>) {
        self.hostname = hostname.into();
        self.cache = DerivedCache::default();
    }

    pub fn set_scheme(&mut self, scheme: Scheme) {
        if self.scheme != scheme {
            self.scheme = scheme;
            self.cache.path = OnceLock::new();
        }
    }

    pub fn set_weight(&mut self, weight: i32) {
        self.weight = weight;
    }

    /// Set the redirect code; `None` means 302.
    pub fn set_redirect(&mut self, code: Option<u16>) {
        self.redirect = Some(code.unwrap_or(302));
    }

    pub fn clear_redirect(&mut self) {
        self.redirect = None;
    }

    /// Override the canonical hostname; `None` restores the stored hostname.
    pub fn set_canonical(&mut self, canonical: Option<String>) {
        self.canonical_override = canonical;
        self.cache.canonical = OnceLock::new();
    }

    pub fn set_match_type(&mut self, match_type: MatchType) {
        self.match_type = match_type;
    }

    /// Whether both records hold the same persisted fields.
    pub(crate) fn same_stored(&self, other: &DomainRecord) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.hostname == other.hostname
            && self.scheme == other.scheme
            && self.weight == other.weight
            && self.is_default == other.is_default
            && self.status == other.status
            && self.redirect == other.redirect
            && self.canonical_override == other.canonical_override
    }

    pub(crate) fn set_default_flag(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    pub(crate) fn set_status(&mut self, status: bool) {
        self.status = status;
    }
}
