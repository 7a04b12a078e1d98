use axum::Router;

use crate::state::SharedState;

/// Token-guarded catalog management.
pub mod admin;
/// Swagger UI.
pub mod docs;
/// Public catalog routes.
pub mod game;
/// Health check route.
pub mod health;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(game::router())
        .merge(admin::router(state.clone()))
        .merge(docs::router())
        .with_state(state)
}
