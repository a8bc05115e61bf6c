use tracing::debug;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload along with the number of live sessions.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let sessions = state.registry().len();
    debug!(sessions, "health check");
    HealthResponse::ok(sessions)
}
