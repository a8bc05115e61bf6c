use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

use crate::state::SharedState;

/// How often the registry is scanned for idle sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Periodically drop sessions idle for longer than the configured timeout.
///
/// Returns immediately when no timeout is configured.
pub async fn run(state: SharedState, period: Duration) {
    let Some(limit) = state.registry().idle_timeout() else {
        info!("session idle timeout disabled; sessions are kept until shutdown");
        return;
    };
    info!(timeout_secs = limit.as_secs(), "session sweeper started");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let removed = state.registry().sweep_expired();
        if !removed.is_empty() {
            info!(count = removed.len(), remaining = state.registry().len(), "expired idle sessions");
        }
    }
}
