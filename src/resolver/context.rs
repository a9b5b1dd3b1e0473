//! Per-request resolution context.

use std::sync::OnceLock;

use crate::domain::DomainRecord;

/// Ambient data for one inbound request.
///
/// Holds the resolved domain for the lifetime of the request only.
#[derive(Debug)]
pub struct RequestContext {
    hostname: String,
    request_uri: String,
    active: OnceLock<Option<DomainRecord>>,
}

impl RequestContext {
    pub fn new(hostname: impl Into<String>, request_uri: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            request_uri: request_uri.into(),
            active: OnceLock::new(),
        }
    }

    /// Request hostname, possibly with a port.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Path and query of the request.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub(crate) fn active_or_init<F>(&self, resolve: F) -> Option<&DomainRecord>
    where
        F: FnOnce() -> Option<DomainRecord>,
    {
        self.active.get_or_init(resolve).as_ref()
    }
}
