//! Domain router daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request (Host: shop.example.com)
//!     ───────────────────────────────────────┐
//!                                            ▼
//!                                   ┌─────────────────┐
//!                                   │  http server    │
//!                                   │ (request id,    │
//!                                   │  trace, timeout)│
//!                                   └────────┬────────┘
//!                                            ▼
//!     ┌──────────────┐  snapshot    ┌─────────────────┐
//!     │   registry   │─────────────▶│    resolver     │
//!     │ (ArcSwap +   │              │ exact/wildcard/ │
//!     │  writer lock)│              │ default         │
//!     └──────┬───────┘              └────────┬────────┘
//!            │ persist                       ▼
//!            ▼                      resolution JSON / redirect
//!     ┌──────────────┐
//!     │    store     │   admin API ──▶ registry writes ──▶ cache invalidation
//!     │ memory/file  │
//!     └──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use domain_router::config::loader::load_config;
use domain_router::lifecycle::{bootstrap, shutdown::trigger_on_ctrl_c, Shutdown};
use domain_router::observability::logging::init_logging;
use domain_router::RouterConfig;

#[derive(Parser)]
#[command(name = "domain-router")]
#[command(about = "Resolve request hostnames to registered domains", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("domain-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage = ?config.storage.backend,
        seeds = config.domains.len(),
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    let app = bootstrap(config)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move { trigger_on_ctrl_c(&signal).await });

    app.run(&shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
