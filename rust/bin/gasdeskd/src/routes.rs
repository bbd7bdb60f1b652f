//! Route registration: collects all module routes + system endpoints.

use std::sync::Arc;

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use gasdesk_core::{Authenticator, Module};
use tracing::info;

use crate::auth_middleware;

/// Build the complete router with all routes behind the auth gate.
pub fn build_router(auth: Arc<dyn Authenticator>, modules: &[&dyn Module]) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for module in modules {
        info!("Mounting module '{}'", module.name());
        app = app.merge(module.routes());
    }

    app.layer(middleware::from_fn_with_state(
        auth,
        auth_middleware::auth_gate,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "gasdeskd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
