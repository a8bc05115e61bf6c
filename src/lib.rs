//! Library crate for trivia-back, exposing modules for binaries and integration tests.

/// Runtime configuration loaded from disk.
pub mod config;
/// Request, response and WebSocket payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP and WebSocket routes.
pub mod routes;
/// Game operations, WebSocket handling and background tasks.
pub mod services;
/// Shared in-memory state: sessions, registry and leaderboard.
pub mod state;
