/// OpenAPI documentation generation.
pub mod documentation;
/// Session, answer and leaderboard operations behind the REST routes.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Open Trivia Database client.
pub mod opentdb;
/// Question bank loading, selection and answer checking.
pub mod question_bank;
/// Background expiry of idle sessions.
pub mod session_sweeper;
/// WebSocket connection and message handling service.
pub mod websocket_service;
