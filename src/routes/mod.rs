use axum::Router;

use crate::state::SharedState;

/// Contest listing, detail and feedback endpoints.
pub mod contests;
/// OpenAPI document and Swagger UI.
pub mod docs;
/// Entry submission, listing and voting endpoints.
pub mod entries;
/// Health check endpoint.
pub mod health;
/// Manual matchmaking trigger.
pub mod matchmaking;
/// Simulation-mode session endpoints.
pub mod session;
/// Server-sent events streams.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(entries::router())
        .merge(contests::router())
        .merge(matchmaking::router())
        .merge(session::router())
        .merge(sse::router());

    api_router.merge(docs::router()).with_state(state)
}
