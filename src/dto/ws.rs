use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
/// Messages accepted from trivia WebSocket clients.
#[serde(tag = "action")]
pub enum ClientMessage {
    /// Attach the socket to a session so it receives the session's broadcasts.
    #[serde(rename = "joinSession", rename_all = "camelCase")]
    JoinSession {
        /// Session to attach to.
        session_id: String,
    },
    /// Any other action; logged and ignored.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse a raw text frame.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
/// Events pushed to every connection attached to a session.
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Number of players currently in the roster.
    PlayerCount {
        /// Roster size.
        count: usize,
    },
    /// One tick of the pre-game countdown, in seconds left.
    Countdown {
        /// Seconds left.
        time: u32,
    },
    /// Best player score in the session.
    HighScore {
        /// Best score.
        score: i64,
    },
    /// Every player has finished.
    SessionComplete,
}
