use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{game::Player, leaderboard::LeaderboardEntry};

/// Payload used to start a new game session.
///
/// The whole body is optional; a missing count falls back to the configured default.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    /// Number of questions to draw; must be positive.
    #[serde(default)]
    pub num_questions: Option<i64>,
}

/// Identifiers returned once a session has been created.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    /// Human-readable status.
    pub message: String,
    /// Identifier of the new session.
    pub session_id: String,
    /// `<host>/join/<sessionId>`, meant to be shared with other players.
    pub shareable_link: String,
}

/// Player created by a join request.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameResponse {
    /// Human-readable status.
    pub message: String,
    /// Identifier to send with answers.
    pub player_id: Uuid,
    /// Display name ("Player N").
    pub player_name: String,
}

impl From<Player> for JoinGameResponse {
    fn from(player: Player) -> Self {
        Self {
            message: "Player joined successfully.".into(),
            player_id: player.id,
            player_name: player.name,
        }
    }
}

/// Final single-player score of a session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndGameResponse {
    /// Human-readable status.
    pub message: String,
    /// Aggregate single-player score.
    pub final_score: i64,
}

/// Score line of one player.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    /// Display name.
    pub player_name: String,
    /// Points earned.
    pub score: i64,
}

/// Multiplayer results: every score, the best score and who reached it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalScoresResponse {
    /// Every player in join order.
    pub scores: Vec<PlayerScore>,
    /// Names of every player tied at the high score.
    pub winners: Vec<String>,
    /// Best score, 0 without players.
    pub high_score: i64,
}

impl From<Vec<Player>> for FinalScoresResponse {
    fn from(players: Vec<Player>) -> Self {
        let high_score = players.iter().map(|p| p.score).max().unwrap_or(0);
        let winners = players
            .iter()
            .filter(|p| p.score == high_score)
            .map(|p| p.name.clone())
            .collect();
        let scores = players
            .into_iter()
            .map(|p| PlayerScore {
                player_name: p.name,
                score: p.score,
            })
            .collect();

        Self {
            scores,
            winners,
            high_score,
        }
    }
}

/// Player id to share of right answers (`"75.00%"`, or `"N/A"`), best first.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct LeaderboardResponse {
    /// Player id to formatted share.
    #[schema(value_type = Object)]
    pub standings: IndexMap<String, String>,
}

impl From<Vec<(Uuid, LeaderboardEntry)>> for LeaderboardResponse {
    fn from(standings: Vec<(Uuid, LeaderboardEntry)>) -> Self {
        let standings = standings
            .into_iter()
            .map(|(id, entry)| {
                let share = entry
                    .ratio()
                    .map(|ratio| format!("{:.2}%", ratio * 100.0))
                    .unwrap_or_else(|| "N/A".into());
                (id.to_string(), share)
            })
            .collect();
        Self { standings }
    }
}
