//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → used once at startup to build the registry and servers
//!
//! Record file changes (file backend, watch = true):
//!     watcher.rs detects change
//!     → Registry::reload re-reads the store
//!     → resolver observes the new snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::{
    AdminConfig, DomainSeed, ListenerConfig, ObservabilityConfig, ProbeConfig, RouterConfig,
    StorageBackend, StorageConfig, TimeoutConfig,
};
