use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::answer::{
        AnswerResponse, AnswerSubmission, MessageResponse, PlayerFinishedRequest,
        QuestionsResponse,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes used while a game is being played.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/questions/{session_id}", get(get_questions))
        .route("/answer", post(submit_answer))
        .route("/player/finished", post(player_finished))
}

/// List the questions assigned to a session.
#[utoipa::path(
    get,
    path = "/questions/{session_id}",
    tag = "answers",
    params(("session_id" = String, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Session questions", body = QuestionsResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_questions(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let response = game_service::session_questions(&state, &session_id)?;
    Ok(Json(response))
}

/// Submit an answer; in multiplayer only the first correct answer to a question scores.
#[utoipa::path(
    post,
    path = "/answer",
    tag = "answers",
    request_body = AnswerSubmission,
    responses(
        (status = 200, description = "Answer scored", body = AnswerResponse),
        (status = 400, description = "Malformed submission"),
        (status = 404, description = "Unknown session, player or question")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerSubmission>,
) -> Result<Json<AnswerResponse>, AppError> {
    payload.validate()?;
    let response = game_service::submit_answer(&state, payload).await?;
    Ok(Json(response))
}

/// Mark a player as finished; broadcasts `sessionComplete` once everyone is done.
#[utoipa::path(
    post,
    path = "/player/finished",
    tag = "answers",
    request_body = PlayerFinishedRequest,
    responses(
        (status = 200, description = "Player marked as finished", body = MessageResponse),
        (status = 400, description = "Malformed request"),
        (status = 404, description = "Unknown session or player")
    )
)]
pub async fn player_finished(
    State(state): State<SharedState>,
    Json(payload): Json<PlayerFinishedRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let response = game_service::mark_player_finished(&state, payload).await?;
    Ok(Json(response))
}
