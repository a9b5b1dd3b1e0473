//! Response shapes and error mapping.
//!
//! # Design Decisions
//! - Errors render as `{"error": kind, "message": text}`
//! - Invariant violations are 422, duplicates 409, missing records 404
//! - `NoActiveDomain` is a 503: the router is misconfigured, not the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::{DomainLink, DomainRecord, MatchType, Scheme};
use crate::error::DomainError;

/// Public description of a domain record.
#[derive(Debug, Clone, Serialize)]
pub struct DomainView {
    pub id: String,
    pub domain_id: u32,
    pub name: String,
    pub hostname: String,
    pub canonical: String,
    pub scheme: Scheme,
    pub weight: i32,
    pub is_default: bool,
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<u16>,
    pub path: String,
}

impl From<&DomainRecord> for DomainView {
    fn from(record: &DomainRecord) -> Self {
        Self {
            id: record.id().to_string(),
            domain_id: record.domain_id(),
            name: record.name().to_string(),
            hostname: record.hostname().to_string(),
            canonical: record.canonical().to_string(),
            scheme: record.scheme(),
            weight: record.weight(),
            is_default: record.is_default(),
            status: record.status(),
            redirect: record.redirect(),
            path: record.path().to_string(),
        }
    }
}

/// Domain resolved for a request.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    #[serde(flatten)]
    pub domain: DomainView,
    pub match_type: MatchType,
    pub url: String,
    /// Canonical link for the current request.
    pub link: DomainLink,
}

/// Error wrapper rendering a `DomainError` as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

/// HTTP status for a domain error.
pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::DuplicateHostname(_) | DomainError::DuplicateId(_) => StatusCode::CONFLICT,
        DomainError::CannotDeleteDefault(_)
        | DomainError::CannotDisableDefault(_)
        | DomainError::CannotPromoteDisabled(_)
        | DomainError::DefaultRequired(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::UnknownField(_)
        | DomainError::InvalidValue { .. }
        | DomainError::InvalidHostname(_) => StatusCode::BAD_REQUEST,
        DomainError::NoActiveDomain => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::ProbeFailure(_) => StatusCode::BAD_GATEWAY,
        DomainError::InvalidatorFailure(_) | DomainError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
