//! HTTP surface for the campus records store.
//!
//! # Responsibility
//! - Translate requests into domain service calls.
//! - Map service outcomes onto status codes and JSON bodies.
//!
//! # Invariants
//! - Each request performs at most one service call, which is one store
//!   transaction.
//! - Handlers never touch SQL directly.

mod error;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::routing::get;
use axum::Router;

/// Builds the complete application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::departments::routes())
        .merge(routes::students::routes())
        .merge(routes::lectures::routes())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
