use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Trivia Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::start_game,
        crate::routes::game::join_game,
        crate::routes::game::end_game,
        crate::routes::game::final_scores,
        crate::routes::answer::get_questions,
        crate::routes::answer::submit_answer,
        crate::routes::answer::player_finished,
        crate::routes::leaderboard::get_leaderboard,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::StartGameRequest,
            crate::dto::game::StartGameResponse,
            crate::dto::game::JoinGameResponse,
            crate::dto::game::EndGameResponse,
            crate::dto::game::PlayerScore,
            crate::dto::game::FinalScoresResponse,
            crate::dto::game::LeaderboardResponse,
            crate::dto::answer::QuestionView,
            crate::dto::answer::QuestionsResponse,
            crate::dto::answer::AnswerSubmission,
            crate::dto::answer::AnswerResponse,
            crate::dto::answer::PlayerFinishedRequest,
            crate::dto::answer::MessageResponse,
            crate::dto::ws::SessionEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Session lifecycle"),
        (name = "answers", description = "Questions, answers and completion"),
        (name = "leaderboard", description = "Results across sessions"),
        (name = "realtime", description = "WebSocket session updates"),
    )
)]
pub struct ApiDoc;
