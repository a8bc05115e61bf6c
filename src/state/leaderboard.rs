use std::cmp::Ordering;

use indexmap::IndexMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Accumulated results of one player across every session they finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Questions answered right, summed over sessions.
    pub right_answers: u64,
    /// Questions played, summed over sessions.
    pub total_questions: u64,
}

impl LeaderboardEntry {
    /// Share of questions answered right, `None` when no question was played.
    pub fn ratio(&self) -> Option<f64> {
        (self.total_questions > 0).then(|| self.right_answers as f64 / self.total_questions as f64)
    }
}

/// Process-wide leaderboard fed each time a player finishes a session.
#[derive(Default)]
pub struct Leaderboard {
    entries: Mutex<IndexMap<Uuid, LeaderboardEntry>>,
}

impl Leaderboard {
    /// Empty leaderboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished session's results to `player_id`'s entry.
    pub async fn record(&self, player_id: Uuid, right_answers: u64, total_questions: u64) {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(player_id).or_default();
        entry.right_answers += right_answers;
        entry.total_questions += total_questions;
    }

    /// Entries ordered by ratio, best first. Entries without questions come last.
    pub async fn standings(&self) -> Vec<(Uuid, LeaderboardEntry)> {
        let mut standings: Vec<_> = self
            .entries
            .lock()
            .await
            .iter()
            .map(|(id, entry)| (*id, *entry))
            .collect();
        standings.sort_by(|(_, a), (_, b)| match (a.ratio(), b.ratio()) {
            (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        standings
    }
}
