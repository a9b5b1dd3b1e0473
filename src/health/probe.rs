//! HTTP response probing for domain records.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::ProbeConfig;
use crate::domain::DomainRecord;
use crate::error::{DomainError, Result};
use crate::observability::metrics;

/// Checks what a domain answers over HTTP.
#[async_trait]
pub trait ResponseProbe: Send + Sync {
    /// Status code returned for the domain's base path.
    async fn check_response(&self, record: &DomainRecord) -> Result<u16>;
}

/// Probe issuing a GET against the domain path.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent("domain-router-probe")
            .build()
            .map_err(|e| DomainError::ProbeFailure(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ResponseProbe for HttpProbe {
    async fn check_response(&self, record: &DomainRecord) -> Result<u16> {
        let response = self
            .client
            .get(record.path())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::ProbeFailure(format!("timeout probing {}", record.path()))
                } else {
                    DomainError::ProbeFailure(e.to_string())
                }
            })?;
        Ok(response.status().as_u16())
    }
}

/// Caches probe results per domain id.
pub struct ResponseChecker {
    probe: Option<Arc<dyn ResponseProbe>>,
    responses: DashMap<String, u16>,
}

impl ResponseChecker {
    pub fn new(probe: Arc<dyn ResponseProbe>) -> Self {
        Self {
            probe: Some(probe),
            responses: DashMap::new(),
        }
    }

    /// Checker that never probes; only explicitly set codes are returned.
    pub fn disabled() -> Self {
        Self {
            probe: None,
            responses: DashMap::new(),
        }
    }

    /// Cached response code, probing once when absent.
    pub async fn get_response(&self, record: &DomainRecord) -> Option<u16> {
        if let Some(code) = self.cached(record.id()) {
            return Some(code);
        }
        let probe = self.probe.as_ref()?;

        match probe.check_response(record).await {
            Ok(code) => {
                tracing::debug!(id = %record.id(), status = code, "Domain response checked");
                metrics::record_probe("success");
                self.set_response(record.id(), code);
                Some(code)
            }
            Err(e) => {
                tracing::warn!(id = %record.id(), path = %record.path(), error = %e, "Domain response check failed");
                metrics::record_probe("failure");
                None
            }
        }
    }

    pub fn set_response(&self, id: &str, code: u16) {
        self.responses.insert(id.to_string(), code);
    }

    pub fn cached(&self, id: &str) -> Option<u16> {
        self.responses.get(id).map(|r| *r.value()).filter(|code| *code != 0)
    }

    pub fn clear(&self) {
        self.responses.clear();
    }

    /// Purge cached codes whenever site URLs are invalidated.
    pub async fn watch_invalidations(
        self: Arc<Self>,
        mut invalidations: broadcast::Receiver<Vec<String>>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                received = invalidations.recv() => match received {
                    Ok(tags) => {
                        if tags.iter().any(|t| t == "url.site") {
                            tracing::debug!("Site URLs invalidated, clearing response cache");
                            self.clear();
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Invalidation listener lagged, clearing response cache");
                        self.clear();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = shutdown.recv() => break,
            }
        }
        tracing::debug!("Response cache listener stopped");
    }
}
