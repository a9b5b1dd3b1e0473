//! Multi-hostname domain routing library.
//!
//! Maps request hostnames to registered domain records, keeps exactly one
//! enabled default domain under concurrent edits, and derives canonical
//! paths and URLs per domain.

pub mod admin;
pub mod config;
pub mod domain;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resolver;

pub use config::schema::RouterConfig;
pub use domain::{DomainRecord, DomainUpdate, MatchType, NewDomain, Scheme};
pub use error::DomainError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::Registry;
pub use resolver::{RequestContext, Resolver};
