/// Question and player records.
pub mod game;
/// Results accumulated across sessions.
pub mod leaderboard;
/// Store of live sessions.
pub mod registry;
/// Per-session state and broadcasting.
pub mod session;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::ServiceError,
    state::{game::Question, leaderboard::Leaderboard, registry::SessionRegistry, session::Session},
};

/// Cheaply clonable handle to [`AppState`] shared by every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: question bank, live sessions and the global leaderboard.
pub struct AppState {
    config: Arc<AppConfig>,
    questions: Arc<[Question]>,
    registry: SessionRegistry,
    leaderboard: Leaderboard,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, questions: Vec<Question>) -> SharedState {
        let registry = SessionRegistry::new(config.session_idle_timeout());
        Arc::new(Self {
            config: Arc::new(config),
            questions: questions.into(),
            registry,
            leaderboard: Leaderboard::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// Full question bank new sessions draw from.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Registry of live sessions keyed by their identifier.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Results accumulated across finished sessions.
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Resolve a session or fail with a not-found error.
    pub fn require_session(&self, id: &str) -> Result<Arc<Session>, ServiceError> {
        self.registry.require_session(id)
    }
}
