//! Axum router — maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::auth::require_login;
use crate::handlers::{
    api::records,
    collect::{scrape, search},
    export::{export_csv, export_pdf},
    login::{login, logout},
    pages::{health, index},
};
use crate::session::session_layer;
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    router(Arc::new(state))
}

/// Same as `build_router`, for callers that keep a handle on the state.
pub fn router(shared: SharedState) -> Router {
    // Behind the login gate
    let protected = Router::new()
        .route("/logout",      post(logout))
        .route("/search",      post(search))
        .route("/scrape",      post(scrape))
        .route("/export/csv",  get(export_csv))
        .route("/export/pdf",  get(export_pdf))
        .route("/api/records", get(records))
        .route_layer(middleware::from_fn_with_state(shared.clone(), require_login));

    // Everything that reads or writes a session. `/health` stays outside so
    // health checks never create one.
    let sessioned = Router::new()
        .route("/",      get(index))
        .route("/login", post(login))
        .merge(protected)
        .route_layer(middleware::from_fn_with_state(shared.clone(), session_layer));

    Router::new()
        .route("/health", get(health))
        .merge(sessioned)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
