use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, header::HOST},
    routing::{get, post},
};
use tracing::debug;

use crate::{
    dto::game::{
        EndGameResponse, FinalScoresResponse, JoinGameResponse, StartGameRequest,
        StartGameResponse,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling the session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/game/start", post(start_game))
        .route("/game/join/{session_id}", post(join_game))
        .route("/game/end/{session_id}", get(end_game))
        .route("/final-scores/{session_id}", get(final_scores))
}

/// Create a new session and return its identifier with a shareable join link.
///
/// The body is optional: a missing or unreadable body uses the default question count.
#[utoipa::path(
    post,
    path = "/game/start",
    tag = "game",
    request_body(content = StartGameRequest, description = "Optional question count"),
    responses(
        (status = 200, description = "Session created", body = StartGameResponse),
        (status = 400, description = "Non-positive question count")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StartGameResponse>, AppError> {
    let request = if body.is_empty() {
        StartGameRequest::default()
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|err| {
            debug!(error = %err, "unreadable start body; using defaults");
            StartGameRequest::default()
        })
    };
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    let response = game_service::start_game(&state, request, host)?;
    Ok(Json(response))
}

/// Join a session as a new player.
#[utoipa::path(
    post,
    path = "/game/join/{session_id}",
    tag = "game",
    params(("session_id" = String, Path, description = "Identifier of the session to join")),
    responses(
        (status = 200, description = "Player joined", body = JoinGameResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<JoinGameResponse>, AppError> {
    let response = game_service::join_game(&state, &session_id).await?;
    Ok(Json(response))
}

/// End a single-player game and return its final score.
#[utoipa::path(
    get,
    path = "/game/end/{session_id}",
    tag = "game",
    params(("session_id" = String, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Final score", body = EndGameResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn end_game(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<EndGameResponse>, AppError> {
    let response = game_service::end_game(&state, &session_id).await?;
    Ok(Json(response))
}

/// Return every player's score and the winners of a multiplayer session.
#[utoipa::path(
    get,
    path = "/final-scores/{session_id}",
    tag = "game",
    params(("session_id" = String, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Scores and winners", body = FinalScoresResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn final_scores(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<FinalScoresResponse>, AppError> {
    let response = game_service::final_scores(&state, &session_id).await?;
    Ok(Json(response))
}
