//! Application-level configuration loading: question bank location and game tuning.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_BACK_CONFIG_PATH";
const DEFAULT_QUESTIONS_PATH: &str = "questions.json";
const DEFAULT_QUESTION_COUNT: i64 = 10;
const DEFAULT_COUNTDOWN_SECONDS: u32 = 5;
const DEFAULT_POINTS_PER_ANSWER: i64 = 10;
const DEFAULT_CONNECTION_BUFFER: usize = 32;
const DEFAULT_OPENTDB_AMOUNT: u32 = 10;
/// OpenTDB serves at most this many questions per request.
const MAX_OPENTDB_AMOUNT: u32 = 50;

/// Where the question bank is loaded from at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    /// JSON file at [`AppConfig::questions_path`].
    #[default]
    File,
    /// Multiple-choice questions fetched from the Open Trivia Database.
    OpenTdb,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    question_source: QuestionSource,
    questions_path: PathBuf,
    opentdb_amount: u32,
    default_question_count: i64,
    countdown_seconds: u32,
    points_per_answer: i64,
    connection_buffer: usize,
    session_idle_timeout: Option<Duration>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        questions = %app_config.questions_path.display(),
                        "loaded config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Source of the question bank.
    pub fn question_source(&self) -> QuestionSource {
        self.question_source
    }

    /// Number of questions requested from OpenTDB, between 1 and 50.
    pub fn opentdb_amount(&self) -> u32 {
        self.opentdb_amount
    }

    /// Path of the JSON question bank.
    pub fn questions_path(&self) -> &Path {
        &self.questions_path
    }

    /// Number of questions used when a start request does not ask for a specific count.
    pub fn default_question_count(&self) -> i64 {
        self.default_question_count
    }

    /// Countdown length, in seconds, started when the first player joins.
    pub fn countdown_seconds(&self) -> u32 {
        self.countdown_seconds
    }

    /// Points awarded for a correct answer.
    pub fn points_per_answer(&self) -> i64 {
        self.points_per_answer
    }

    /// Outbound queue capacity of each WebSocket; a full queue gets the socket evicted.
    pub fn connection_buffer(&self) -> usize {
        self.connection_buffer
    }

    /// Inactivity after which a session is discarded; `None` keeps sessions forever.
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        self.session_idle_timeout
    }

    /// Override the question file location.
    pub fn with_questions_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.questions_path = path.into();
        self
    }

    /// Override the countdown length.
    pub fn with_countdown_seconds(mut self, seconds: u32) -> Self {
        self.countdown_seconds = seconds;
        self
    }

    /// Override the idle timeout.
    pub fn with_session_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.session_idle_timeout = timeout;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            question_source: QuestionSource::default(),
            questions_path: PathBuf::from(DEFAULT_QUESTIONS_PATH),
            opentdb_amount: DEFAULT_OPENTDB_AMOUNT,
            default_question_count: DEFAULT_QUESTION_COUNT,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            points_per_answer: DEFAULT_POINTS_PER_ANSWER,
            connection_buffer: DEFAULT_CONNECTION_BUFFER,
            session_idle_timeout: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
///
/// Every field is optional so partial files only override what they mention.
struct RawConfig {
    question_source: Option<QuestionSource>,
    questions_path: Option<PathBuf>,
    opentdb_amount: Option<u32>,
    default_question_count: Option<i64>,
    countdown_seconds: Option<u32>,
    points_per_answer: Option<i64>,
    connection_buffer: Option<usize>,
    session_idle_timeout_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            question_source: value.question_source.unwrap_or(defaults.question_source),
            questions_path: value.questions_path.unwrap_or(defaults.questions_path),
            opentdb_amount: value
                .opentdb_amount
                .map(|amount| amount.clamp(1, MAX_OPENTDB_AMOUNT))
                .unwrap_or(defaults.opentdb_amount),
            default_question_count: value
                .default_question_count
                .unwrap_or(defaults.default_question_count),
            countdown_seconds: value.countdown_seconds.unwrap_or(defaults.countdown_seconds),
            points_per_answer: value.points_per_answer.unwrap_or(defaults.points_per_answer),
            // mpsc::channel panics on a zero capacity
            connection_buffer: value
                .connection_buffer
                .filter(|buffer| *buffer > 0)
                .unwrap_or(defaults.connection_buffer),
            session_idle_timeout: value
                .session_idle_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
