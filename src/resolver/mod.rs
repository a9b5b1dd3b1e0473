//! Hostname resolution.
//!
//! # Responsibilities
//! - Match a request hostname to a domain record
//! - Expose the active domain for one request context
//!
//! # Resolution Order
//! ```text
//! request hostname
//!     → exact match (case-insensitive), enabled     → Exact
//!     → most specific `*.suffix` record, enabled    → Wildcard
//!     → the default record                          → DefaultFallback
//!     → no enabled records                          → NoActiveDomain
//! ```
//!
//! # Design Decisions
//! - Each resolution reads one registry snapshot, so it never mixes states
//! - The resolved record is cached in the request context only; nothing is
//!   kept across requests
//! - `NoActiveDomain` is an error, never an arbitrary record

pub mod context;

use std::sync::Arc;

use crate::domain::{DomainRecord, MatchType};
use crate::error::{DomainError, Result};
use crate::observability::metrics;
use crate::registry::Registry;

pub use context::RequestContext;

/// Resolves request hostnames against the registry.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<Registry>,
}

impl Resolver {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolve a hostname against the latest registry state.
    pub fn resolve(&self, hostname: &str) -> Result<DomainRecord> {
        let snapshot = self.registry.snapshot();

        let matched = snapshot
            .by_hostname(hostname)
            .filter(|r| r.status())
            .map(|r| (r, MatchType::Exact))
            .or_else(|| {
                snapshot
                    .wildcard_for(hostname)
                    .filter(|r| r.status())
                    .map(|r| (r, MatchType::Wildcard))
            })
            .or_else(|| {
                snapshot
                    .default_record()
                    .filter(|r| r.status())
                    .map(|r| (r, MatchType::DefaultFallback))
            });

        match matched {
            Some((record, match_type)) => {
                let mut record = record.clone();
                record.set_match_type(match_type);
                tracing::debug!(
                    hostname = %hostname,
                    id = %record.id(),
                    match_type = %match_type,
                    "Resolved domain"
                );
                metrics::record_resolution(match_type);
                Ok(record)
            }
            None => {
                tracing::error!(hostname = %hostname, "No active domain: no enabled domain records");
                metrics::record_resolution(MatchType::None);
                Err(DomainError::NoActiveDomain)
            }
        }
    }

    /// Active domain for a request, resolved once per context.
    pub fn get_active_domain<'a>(&self, ctx: &'a RequestContext) -> Result<&'a DomainRecord> {
        ctx.active_or_init(|| self.resolve(ctx.hostname()).ok())
            .ok_or(DomainError::NoActiveDomain)
    }

    /// Whether `record` is the active domain of this request.
    pub fn is_active(&self, record: &DomainRecord, ctx: &RequestContext) -> bool {
        let active = self.get_active_domain(ctx).ok().map(DomainRecord::id);
        record.is_active(active)
    }

    /// URL of the current request on its active domain.
    pub fn active_url(&self, ctx: &RequestContext) -> Result<String> {
        let record = self.get_active_domain(ctx)?;
        Ok(record.url(ctx.request_uri()))
    }
}
