//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the storage backend and registry from configuration
//! - Seed configured records into an empty store
//! - Bind listeners and start background tasks
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when the registry is ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::admin;
use crate::config::watcher::StoreWatcher;
use crate::config::{DomainSeed, RouterConfig, StorageBackend, StorageConfig};
use crate::error::DomainError;
use crate::health::{HttpProbe, ResponseChecker};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::registry::{BroadcastInvalidator, DomainStore, JsonFileStore, MemoryStore, Registry};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Domain registry error: {0}")]
    Domain(#[from] DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Invalid address {0}")]
    Address(String),
}

/// Fully wired application, ready to serve.
pub struct App {
    pub state: AppState,
    invalidations: broadcast::Receiver<Vec<String>>,
}

impl App {
    pub fn registry(&self) -> &Arc<Registry> {
        &self.state.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.state.config
    }

    /// Bind the configured listeners and serve until `shutdown` fires.
    pub async fn run(self, shutdown: &Shutdown) -> Result<(), StartupError> {
        let config = self.state.config.clone();
        let admin_listener = if config.admin.enabled {
            Some(TcpListener::bind(&config.admin.bind_address).await?)
        } else {
            None
        };
        let listener = TcpListener::bind(&config.listener.bind_address).await?;
        self.serve(listener, admin_listener, shutdown).await
    }

    /// Serve on already-bound listeners until `shutdown` fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        shutdown: &Shutdown,
    ) -> Result<(), StartupError> {
        let config = self.state.config.clone();

        if config.observability.metrics_enabled {
            let addr: SocketAddr = config
                .observability
                .metrics_address
                .parse()
                .map_err(|_| StartupError::Address(config.observability.metrics_address.clone()))?;
            metrics::init_metrics(addr);
        }

        // Keep the watcher alive for as long as the servers run.
        let _watcher = match (&config.storage.backend, &config.storage.path) {
            (StorageBackend::File, Some(path)) if config.storage.watch => {
                Some(StoreWatcher::new(Path::new(path), self.state.registry.clone()).run()?)
            }
            _ => None,
        };

        tokio::spawn(
            self.state
                .responses
                .clone()
                .watch_invalidations(self.invalidations, shutdown.subscribe()),
        );

        let admin_task = admin_listener.map(|listener| {
            let state = self.state.clone();
            let admin_shutdown = shutdown.subscribe();
            tokio::spawn(async move {
                if let Err(e) = admin::serve(listener, state, admin_shutdown).await {
                    tracing::error!(error = %e, "Admin API failed");
                }
            })
        });

        HttpServer::new(self.state).run(listener, shutdown.subscribe()).await?;

        if let Some(task) = admin_task {
            let _ = task.await;
        }
        Ok(())
    }
}

/// Build the configured storage backend.
pub fn build_store(config: &StorageConfig) -> Result<Arc<dyn DomainStore>, StartupError> {
    match (&config.backend, &config.path) {
        (StorageBackend::File, Some(path)) => Ok(Arc::new(JsonFileStore::open(path)?)),
        (StorageBackend::File, None) => Err(DomainError::Storage("file backend requires storage.path".into()).into()),
        (StorageBackend::Memory, _) => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Create the seed records when the registry is empty. Returns how many were created.
pub fn seed_domains(registry: &Registry, seeds: &[DomainSeed], ambient_https: bool) -> Result<usize, DomainError> {
    if !registry.is_empty() {
        tracing::debug!(records = registry.len(), "Store not empty, skipping seed domains");
        return Ok(0);
    }
    for seed in seeds {
        registry.create(seed.clone().into(), ambient_https)?;
    }
    if !seeds.is_empty() {
        tracing::info!(count = seeds.len(), "Seeded domain records from configuration");
    }
    Ok(seeds.len())
}

/// Wire store, registry, invalidation and probing from configuration.
pub fn bootstrap(config: RouterConfig) -> Result<App, StartupError> {
    let store = build_store(&config.storage)?;

    // Subscribe before any mutation so seeding already has a listener.
    let invalidator = Arc::new(BroadcastInvalidator::default());
    let invalidations = invalidator.subscribe();

    let registry = Arc::new(Registry::open(store, invalidator)?);
    seed_domains(&registry, &config.domains, config.listener.https)?;

    let responses = if config.probe.enabled {
        Arc::new(ResponseChecker::new(Arc::new(HttpProbe::new(&config.probe)?)))
    } else {
        Arc::new(ResponseChecker::disabled())
    };

    if registry.snapshot().enabled_count() == 0 {
        tracing::warn!("No enabled domain records; every request will fail with no active domain");
    }

    Ok(App {
        state: AppState::new(config, registry, responses),
        invalidations,
    })
}
