//! Error definitions shared by the registry, resolver and collaborators.

use thiserror::Error;

/// Errors produced by domain registry and resolution operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Another record already uses this hostname (case-insensitive).
    #[error("The hostname ({0}) is already registered")]
    DuplicateHostname(String),

    /// Another record already uses this machine id.
    #[error("A domain with id {0} already exists")]
    DuplicateId(String),

    /// No record with the given id or hostname.
    #[error("Domain not found: {0}")]
    NotFound(String),

    /// The default record cannot be deleted while other records exist.
    #[error("Domain {0} is the default and cannot be deleted while other domains exist")]
    CannotDeleteDefault(String),

    /// The default record can never be disabled.
    #[error("Domain {0} is the default and cannot be disabled")]
    CannotDisableDefault(String),

    /// A disabled record cannot become the default.
    #[error("Domain {0} is disabled and cannot become the default")]
    CannotPromoteDisabled(String),

    /// The default flag moves only by promoting another record.
    #[error("Domain {0} is the default; promote another domain instead of clearing the flag")]
    DefaultRequired(String),

    /// No enabled records exist, so no request can be resolved.
    #[error("No active domain: no enabled domain records are registered")]
    NoActiveDomain,

    /// A property name outside the writable field set.
    #[error("The {0} attribute does not exist")]
    UnknownField(String),

    /// A property value that could not be parsed for its field.
    #[error("Invalid value {value:?} for field {field}")]
    InvalidValue { field: String, value: String },

    /// Hostname is empty or not a valid host[:port].
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    /// The cache invalidation collaborator failed (non-fatal).
    #[error("Cache invalidation failed: {0}")]
    InvalidatorFailure(String),

    /// The HTTP probe collaborator failed (non-fatal).
    #[error("Response probe failed: {0}")]
    ProbeFailure(String),

    /// The storage collaborator failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateHostname(_) => "duplicate_hostname",
            Self::DuplicateId(_) => "duplicate_id",
            Self::NotFound(_) => "not_found",
            Self::CannotDeleteDefault(_) => "cannot_delete_default",
            Self::CannotDisableDefault(_) => "cannot_disable_default",
            Self::CannotPromoteDisabled(_) => "cannot_promote_disabled",
            Self::DefaultRequired(_) => "default_required",
            Self::NoActiveDomain => "no_active_domain",
            Self::UnknownField(_) => "unknown_field",
            Self::InvalidValue { .. } => "invalid_value",
            Self::InvalidHostname(_) => "invalid_hostname",
            Self::InvalidatorFailure(_) => "invalidator_failure",
            Self::ProbeFailure(_) => "probe_failure",
            Self::Storage(_) => "storage",
        }
    }

    /// Returns true for failures that are reported but never block the
    /// operation they accompany.
    pub fn is_non_fatal(&self) -> bool {
        matches!(self, Self::InvalidatorFailure(_) | Self::ProbeFailure(_))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T, E = DomainError> = std::result::Result<T, E>;
