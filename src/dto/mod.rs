/// Question listing and answer submission payloads.
pub mod answer;
/// Session lifecycle and results payloads.
pub mod game;
/// Health check payload.
pub mod health;
/// Custom validators shared by request payloads.
pub mod validation;
/// WebSocket client and server messages.
pub mod ws;
