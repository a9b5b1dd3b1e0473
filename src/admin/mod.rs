//! Admin API for managing domain records.
//!
//! Every route requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/domains", get(list_domains).post(create_domain))
        .route(
            "/admin/domains/{id}",
            get(get_domain).patch(update_domain).delete(delete_domain),
        )
        .route("/admin/domains/{id}/default", post(set_default))
        .route("/admin/domains/{id}/enable", post(enable_domain))
        .route("/admin/domains/{id}/disable", post(disable_domain))
        .route("/admin/domains/{id}/property", put(save_property))
        .route("/admin/domains/{id}/response", get(get_response))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin API until the shutdown signal fires.
pub async fn serve(listener: TcpListener, state: AppState, mut shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
