//! Route definitions for the VideoTube API

mod auth;

use axum::{routing::get, Router};

use crate::handlers::health;
use crate::middleware::request_tracing;
use crate::state::AppState;

pub use auth::user_routes;

/// Assemble the full application router. Integration tests drive this
/// directly; `main` adds CORS and serves it.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .merge(user_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(request_tracing))
}
