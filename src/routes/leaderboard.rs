use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::game::LeaderboardResponse, services::game_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    responses((status = 200, description = "Share of right answers per player, best first", body = LeaderboardResponse))
)]
/// Return the standings accumulated across finished sessions.
pub async fn get_leaderboard(State(state): State<SharedState>) -> Json<LeaderboardResponse> {
    Json(game_service::leaderboard(&state).await)
}

/// Configure the leaderboard route.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/leaderboard", get(get_leaderboard))
}
