use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Multiple-choice trivia question as loaded from the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier unique within the question bank.
    pub id: String,
    /// Prompt displayed to players.
    pub question_text: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// Index into [`Question::options`] of the correct answer.
    pub correct_index: usize,
}

/// Player info tracked during a trivia session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Identifier unique within the owning session.
    pub id: Uuid,
    /// Display name derived from the join order ("Player N").
    pub name: String,
    /// Points earned in multiplayer mode.
    pub score: i64,
    /// Set once the player has gone through every question.
    pub finished: bool,
}

impl Player {
    /// Build the `seq`-th player to join a session (1-based).
    pub fn joined(seq: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("Player {seq}"),
            score: 0,
            finished: false,
        }
    }
}
