use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dto::validation::validate_identifier, state::game::Question};

/// Question as shown to players; the correct index stays on the server.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    /// Question identifier.
    pub id: String,
    /// Prompt displayed to players.
    pub question_text: String,
    /// Answer options in display order.
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            question_text: question.question_text.clone(),
            options: question.options.clone(),
        }
    }
}

/// Questions assigned to a session.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionsResponse {
    /// Questions in play order.
    pub questions: Vec<QuestionView>,
}

/// Answer submitted for one question.
///
/// An empty or missing `playerId` means a single-player game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    /// Session the answer belongs to.
    #[validate(custom(function = "validate_identifier"))]
    pub session_id: String,
    /// Answering player; empty or absent in single-player games.
    #[serde(default)]
    pub player_id: Option<String>,
    /// Question being answered.
    #[validate(custom(function = "validate_identifier"))]
    pub question_id: String,
    /// Index of the chosen option.
    pub answer: i64,
}

impl AnswerSubmission {
    /// Player identifier for multiplayer submissions.
    pub fn multiplayer_id(&self) -> Option<&str> {
        self.player_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Outcome of an answer submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    /// In multiplayer, true only for the first correct answer to the question.
    pub correct: bool,
    /// Score after this submission (player score in multiplayer).
    pub current_score: i64,
}

/// Marks a player as done with the session's questions.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFinishedRequest {
    /// Session the player belongs to.
    #[validate(custom(function = "validate_identifier"))]
    pub session_id: String,
    /// Player that went through every question.
    #[validate(custom(function = "validate_identifier"))]
    pub player_id: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable status.
    pub message: String,
}

impl MessageResponse {
    /// Build a response carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
