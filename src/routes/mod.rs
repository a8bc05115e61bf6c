use axum::Router;

use crate::state::SharedState;

/// Question, answer and completion routes.
pub mod answer;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Session lifecycle routes.
pub mod game;
/// Health check route.
pub mod health;
/// Global leaderboard route.
pub mod leaderboard;
/// WebSocket upgrade route.
pub mod websocket;

/// Compose the game, realtime and documentation routes over the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(game::router())
        .merge(answer::router())
        .merge(leaderboard::router())
        .merge(websocket::router())
        .merge(docs::router())
        .with_state(state)
}
