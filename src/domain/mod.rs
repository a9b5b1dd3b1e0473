//! Domain record model.
//!
//! # Data Flow
//! ```text
//! NewDomain / DomainUpdate (caller input)
//!     → registry applies defaults and invariants
//!     → DomainRecord (stored value)
//!     → urls.rs derives path/url on demand
//! ```
//!
//! # Design Decisions
//! - Records are plain values; the registry owns the collection
//! - Derived values live in a small cache reset by the setters that feed them

pub mod fields;
pub mod hostname;
pub mod id;
pub mod record;
pub mod urls;

pub use fields::{DomainField, DomainUpdate, NewDomain};
pub use id::derive_domain_id;
pub use record::{DomainLink, DomainRecord, MatchType, Scheme};
