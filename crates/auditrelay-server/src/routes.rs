//! HTTP route definitions.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .nest("/api/v1/audit", audit_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/enabled", get(handlers::delivery_enabled))
        .route("/components", post(handlers::push_components))
        .route("/k8s", post(handlers::submit_k8s))
        .route("/platform", post(handlers::submit_platform))
        .route("/webconsole", post(handlers::submit_webconsole))
        .route("/generic", post(handlers::submit_generic))
}
