//! Domain response checking.
//!
//! # Data Flow
//! ```text
//! get_response(record)
//!     → cached code for record id?  → return it
//!     → probe.rs issues GET <domain path>
//!     → cache the status code
//!     → failure: warn, leave unset
//!
//! Registry mutation
//!     → invalidation tags (url.site)
//!     → cached codes purged
//! ```
//!
//! # Design Decisions
//! - Probing is lazy: nothing runs until a response code is asked for
//! - Probe failures are non-fatal and never cached

pub mod probe;

pub use probe::{HttpProbe, ResponseChecker, ResponseProbe};
