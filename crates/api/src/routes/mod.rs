//! Route registration, one module per resource.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod story;

/// All authenticated API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(story::router())
}
