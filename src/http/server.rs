//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the negotiation handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Resolve every request's Host header to a domain record
//! - Apply per-domain redirect policy

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RouterConfig;
use crate::domain::{hostname, urls};
use crate::health::ResponseChecker;
use crate::http::request::{
    propagate_request_id_layer, request_host, request_id, request_uri,
    set_request_id_layer,
};
use crate::http::response::{ApiError, DomainView, Resolution};
use crate::registry::Registry;
use crate::resolver::{RequestContext, Resolver};

pub const X_DOMAIN_ID: &str = "x-domain-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub resolver: Resolver,
    pub responses: Arc<ResponseChecker>,
    pub config: Arc<RouterConfig>,
}

impl AppState {
    pub fn new(config: RouterConfig, registry: Arc<Registry>, responses: Arc<ResponseChecker>) -> Self {
        Self {
            resolver: Resolver::new(registry.clone()),
            registry,
            responses,
            config: Arc::new(config),
        }
    }
}

/// HTTP server answering with the domain resolved for each request.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let timeout = Duration::from_secs(state.config.timeouts.request_secs);
        Router::new()
            .fallback(negotiate_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for embedding or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the request hostname and describe (or redirect to) its domain.
async fn negotiate_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let headers = request.headers();
    let request_id = request_id(headers).to_string();

    let Some(host) = request_host(headers, request.uri()) else {
        tracing::warn!(request_id = %request_id, "Request without host");
        return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
    };
    let uri = request_uri(request.uri());
    let ctx = RequestContext::new(host, uri);

    let record = match state.resolver.get_active_domain(&ctx) {
        Ok(record) => record,
        Err(err) => return ApiError(err).into_response(),
    };

    tracing::debug!(
        request_id = %request_id,
        host = %ctx.hostname(),
        id = %record.id(),
        match_type = %record.match_type(),
        "Request negotiated"
    );

    if let Some(code) = record.redirect() {
        let canonical = record.canonical();
        let redirectable = !canonical.starts_with(hostname::WILDCARD_PREFIX);
        if redirectable && hostname::normalize(canonical) != hostname::normalize(ctx.hostname()) {
            let location = urls::build_url(record.scheme(), canonical, ctx.request_uri());
            let status = StatusCode::from_u16(code)
                .ok()
                .filter(StatusCode::is_redirection)
                .unwrap_or(StatusCode::FOUND);
            tracing::info!(
                request_id = %request_id,
                from = %ctx.hostname(),
                to = %location,
                status = status.as_u16(),
                "Redirecting to canonical domain"
            );
            return match HeaderValue::from_str(&location) {
                Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
                Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target").into_response(),
            };
        }
    }

    let mut domain = DomainView::from(record);
    domain.path = urls::build_path(record.scheme(), record.hostname(), &state.config.base_path);
    let body = Resolution {
        domain,
        match_type: record.match_type(),
        url: record.url(ctx.request_uri()),
        link: record.link(Some(ctx.request_uri())),
    };

    let mut response = Json(body).into_response();
    if let Ok(value) = HeaderValue::from_str(&record.domain_id().to_string()) {
        response.headers_mut().insert(X_DOMAIN_ID, value);
    }
    response
}
