//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, host, URI, TLS flag)
//!     → resolver (host → domain record)
//!     → response.rs (resolution JSON, redirects, error mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{ApiError, DomainView, Resolution};
pub use server::{AppState, HttpServer};
