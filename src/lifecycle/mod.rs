//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Store → Registry (+ seed records) → Listeners
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → servers drain → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: store first, then registry, then listeners
//! - Fail fast: any startup error is fatal
//! - Every collaborator is built once here and handed down explicitly

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, App, StartupError};
