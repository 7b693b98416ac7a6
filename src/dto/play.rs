//! Player-facing wire types for the live-play endpoints.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::dto::{question::Question, validation::validate_display_name};

/// Body for `POST /play/join/{sessionId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Display name for the joining player.
    pub name: String,
}

impl Validate for JoinRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Response to a join request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    /// Backend-minted identifier scoping all further player calls.
    pub player_id: u64,
}

/// Response to `GET /play/{playerId}/status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusResponse {
    /// True once the admin has started the session.
    pub started: bool,
}

/// Envelope around the current-question feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEnvelope {
    /// The question currently at the session position.
    pub question: Question,
}

/// Body for `PUT /play/{playerId}/answer`: the full current selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    /// Indices of every currently selected option.
    pub answers: Vec<usize>,
}

/// Response to `GET /play/{playerId}/answer`, the correct-answer reveal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectAnswers {
    /// Indices of the correct options for the current question.
    pub answers: Vec<usize>,
}

/// One per-question record from `GET /play/{playerId}/results`.
///
/// The feed is ordered by question and carries correctness plus raw
/// timestamps only; points and durations come from the local cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// Whether the delivered selection matched the correct answers.
    #[serde(default)]
    pub correct: bool,
    /// RFC 3339 timestamp taken when the question was served.
    #[serde(default)]
    pub question_started_at: Option<String>,
    /// RFC 3339 timestamp of the last delivered submission.
    #[serde(default)]
    pub answered_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_request_rejects_blank_names() {
        assert!(JoinRequest { name: "Ada".into() }.validate().is_ok());
        assert!(JoinRequest { name: "  ".into() }.validate().is_err());
    }

    #[test]
    fn answer_outcome_tolerates_missing_timestamps() {
        let outcome: AnswerOutcome = serde_json::from_value(serde_json::json!({
            "correct": true,
        }))
        .unwrap();
        assert!(outcome.correct);
        assert!(outcome.question_started_at.is_none());
        assert!(outcome.answered_at.is_none());
    }
}
