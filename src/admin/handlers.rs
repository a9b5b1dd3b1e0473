use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainUpdate, NewDomain};
use crate::http::request::request_is_https;
use crate::http::{ApiError, AppState, DomainView};
use crate::registry::DefaultOutcome;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub records: usize,
    pub enabled: usize,
    pub default: Option<String>,
}

#[derive(Serialize)]
pub struct DefaultChange {
    pub id: String,
    pub outcome: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyWrite {
    pub field: String,
    pub value: String,
}

#[derive(Serialize)]
pub struct ResponseStatus {
    pub id: String,
    pub path: String,
    pub response: Option<u16>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let snapshot = state.registry.snapshot();
    let status = if snapshot.enabled_count() > 0 { "operational" } else { "no_active_domain" };
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status,
        records: snapshot.len(),
        enabled: snapshot.enabled_count(),
        default: snapshot.default_record().map(|r| r.id().to_string()),
    })
}

pub async fn list_domains(State(state): State<AppState>) -> Json<Vec<DomainView>> {
    let domains = state.registry.list_all();
    Json(domains.iter().map(DomainView::from).collect())
}

pub async fn get_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DomainView>> {
    let record = state.registry.get(&id)?;
    Ok(Json(DomainView::from(&record)))
}

pub async fn create_domain(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new): Json<NewDomain>,
) -> ApiResult<(StatusCode, Json<DomainView>)> {
    let ambient_https = request_is_https(&headers, state.config.listener.https);
    let record = state.registry.create(new, ambient_https)?;
    Ok((StatusCode::CREATED, Json(DomainView::from(&record))))
}

pub async fn update_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DomainUpdate>,
) -> ApiResult<Json<DomainView>> {
    let record = state.registry.update(&id, update)?;
    Ok(Json(DomainView::from(&record)))
}

pub async fn delete_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DomainView>> {
    let record = state.registry.delete(&id)?;
    Ok(Json(DomainView::from(&record)))
}

pub async fn set_default(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DefaultChange>> {
    let outcome = match state.registry.set_default(&id)? {
        DefaultOutcome::Promoted => "promoted",
        DefaultOutcome::AlreadyDefault => "already_default",
    };
    Ok(Json(DefaultChange { id, outcome }))
}

pub async fn enable_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DomainView>> {
    let record = state.registry.enable(&id)?;
    Ok(Json(DomainView::from(&record)))
}

pub async fn disable_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DomainView>> {
    let record = state.registry.disable(&id)?;
    Ok(Json(DomainView::from(&record)))
}

pub async fn save_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(write): Json<PropertyWrite>,
) -> ApiResult<Json<DomainView>> {
    let record = state.registry.save_property(&id, &write.field, &write.value)?;
    Ok(Json(DomainView::from(&record)))
}

pub async fn get_response(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResponseStatus>> {
    let record = state.registry.get(&id)?;
    let response = state.responses.get_response(&record).await;
    Ok(Json(ResponseStatus {
        id,
        path: record.path().to_string(),
        response,
    }))
}
