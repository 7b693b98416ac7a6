//! DTO definitions used by the admin session-control endpoints.

use serde::{Deserialize, Serialize};

use crate::dto::{play::AnswerOutcome, question::Question};

/// Admin-issued session command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MutationType {
    /// Start the session or move the position forward by one question.
    Advance,
    /// Irreversibly terminate the session.
    End,
}

/// Body for `POST /admin/game/{gameId}/mutate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRequest {
    /// The command to apply to the game's active session.
    pub mutation_type: MutationType,
}

/// Acknowledgement returned by the mutate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Backend-defined status payload; shape varies by mutation.
    #[serde(default)]
    pub status: serde_json::Value,
}

/// Envelope around `GET /admin/session/{sessionId}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusEnvelope {
    /// The observable state of the session.
    pub results: SessionStatus,
}

/// Observable state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Index of the active question, `-1` while in the lobby.
    pub position: i64,
    /// False once the session has ended; never returns to true.
    pub active: bool,
    /// Question snapshot taken at session start.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Envelope around `GET /admin/session/{sessionId}/results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResultsEnvelope {
    /// Per-player answer roster, one entry per joined player.
    pub results: Vec<PlayerRecord>,
}

/// Answer history of one player, ordered by question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Display name chosen at join time.
    pub name: String,
    /// One outcome per question the player saw.
    #[serde(default)]
    pub answers: Vec<AnswerOutcome>,
}
