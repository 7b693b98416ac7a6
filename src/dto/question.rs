//! Wire representation of quiz questions shared by the player and admin feeds.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::dto::validation::validate_option_count;

/// Kind of a quiz question, driving how many options may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// At most one option selected; exactly one correct answer.
    Single,
    /// Any non-empty subset may be selected; one or more correct answers.
    Multiple,
    /// True/false variant with the same selection rule as [`Self::Single`].
    Judgement,
}

impl QuestionKind {
    /// Apply a click on `index` to `current`, returning the new selection.
    ///
    /// Single and judgement questions hold at most one selection; clicking the
    /// selected option clears it and clicking another replaces it. Multiple
    /// choice toggles membership.
    pub fn toggle(self, current: &[usize], index: usize) -> Vec<usize> {
        match self {
            QuestionKind::Single | QuestionKind::Judgement => {
                if current.first() == Some(&index) {
                    Vec::new()
                } else {
                    vec![index]
                }
            }
            QuestionKind::Multiple => {
                if current.contains(&index) {
                    current.iter().copied().filter(|&i| i != index).collect()
                } else {
                    let mut next = current.to_vec();
                    next.push(index);
                    next
                }
            }
        }
    }
}

/// How the optional media attachment of a question should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaMode {
    /// `media` carries an embeddable URL.
    #[default]
    Url,
    /// `image_data` carries an inline base64 payload.
    Image,
}

/// A question as delivered by the backend feeds.
///
/// The player-facing question feed omits `correct_answers`; validation only
/// applies to complete definitions such as the admin session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique within a game, allocated monotonically.
    pub id: u64,
    /// Prompt shown to players.
    #[serde(rename = "question")]
    pub text: String,
    /// Question kind, selecting the answer-cardinality rule.
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Answer window in seconds.
    pub duration: u32,
    /// Raw points awarded for a correct answer.
    pub points: u32,
    /// Candidate answers, between two and six of them.
    pub option_answers: Vec<String>,
    /// Indices into `option_answers` marking the correct answers.
    #[serde(default)]
    pub correct_answers: Vec<usize>,
    /// Media attachment URL; empty when absent.
    #[serde(default)]
    pub media: String,
    /// Interpretation of the media attachment.
    #[serde(default)]
    pub media_mode: MediaMode,
    /// Inline image payload; empty when absent.
    #[serde(default)]
    pub image_data: String,
}

impl Validate for Question {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_option_count(&self.option_answers) {
            errors.add("option_answers", e);
        }

        if let Some(&index) = self
            .correct_answers
            .iter()
            .find(|&&index| index >= self.option_answers.len())
        {
            let mut err = ValidationError::new("correct_answer_range");
            err.message = Some(
                format!(
                    "correct answer index {index} out of range ({} options)",
                    self.option_answers.len()
                )
                .into(),
            );
            errors.add("correct_answers", err);
        }

        let expected_one = matches!(self.kind, QuestionKind::Single | QuestionKind::Judgement);
        if expected_one && self.correct_answers.len() != 1 {
            let mut err = ValidationError::new("correct_answer_cardinality");
            err.message = Some("single/judgement questions declare exactly one correct answer".into());
            errors.add("correct_answers", err);
        } else if !expected_one && self.correct_answers.is_empty() {
            let mut err = ValidationError::new("correct_answer_cardinality");
            err.message = Some("multiple-choice questions declare at least one correct answer".into());
            errors.add("correct_answers", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionKind, correct: Vec<usize>) -> Question {
        Question {
            id: 1,
            text: "capital of France?".into(),
            kind,
            duration: 30,
            points: 10,
            option_answers: vec!["Paris".into(), "Lyon".into(), "Nice".into()],
            correct_answers: correct,
            media: String::new(),
            media_mode: MediaMode::Url,
            image_data: String::new(),
        }
    }

    #[test]
    fn single_click_selects_and_replaces() {
        let kind = QuestionKind::Single;
        assert_eq!(kind.toggle(&[], 1), vec![1]);
        assert_eq!(kind.toggle(&[1], 2), vec![2]);
    }

    #[test]
    fn single_click_on_selected_clears() {
        assert_eq!(QuestionKind::Single.toggle(&[1], 1), Vec::<usize>::new());
        assert_eq!(QuestionKind::Judgement.toggle(&[0], 0), Vec::<usize>::new());
    }

    #[test]
    fn multiple_click_toggles_membership() {
        let kind = QuestionKind::Multiple;
        assert_eq!(kind.toggle(&[], 0), vec![0]);
        assert_eq!(kind.toggle(&[0], 2), vec![0, 2]);
        assert_eq!(kind.toggle(&[0, 2], 0), vec![2]);
    }

    #[test]
    fn deserializes_wire_names() {
        let payload = serde_json::json!({
            "id": 3,
            "question": "2 + 2?",
            "type": "single",
            "duration": 15,
            "points": 5,
            "optionAnswers": ["3", "4"],
            "correctAnswers": [1],
            "media": "",
            "mediaMode": "url",
            "imageData": "",
        });

        let question: Question = serde_json::from_value(payload).unwrap();
        assert_eq!(question.kind, QuestionKind::Single);
        assert_eq!(question.option_answers, vec!["3", "4"]);
        assert_eq!(question.correct_answers, vec![1]);
    }

    #[test]
    fn player_feed_omits_correct_answers() {
        let payload = serde_json::json!({
            "id": 7,
            "question": "pick two",
            "type": "multiple",
            "duration": 20,
            "points": 10,
            "optionAnswers": ["a", "b", "c"],
        });

        let question: Question = serde_json::from_value(payload).unwrap();
        assert!(question.correct_answers.is_empty());
        assert_eq!(question.media_mode, MediaMode::Url);
    }

    #[test]
    fn validate_rejects_out_of_range_correct_answer() {
        let question = question(QuestionKind::Single, vec![5]);
        assert!(question.validate().is_err());
    }

    #[test]
    fn validate_enforces_cardinality_per_kind() {
        assert!(question(QuestionKind::Single, vec![0]).validate().is_ok());
        assert!(question(QuestionKind::Single, vec![0, 1]).validate().is_err());
        assert!(question(QuestionKind::Judgement, vec![]).validate().is_err());
        assert!(question(QuestionKind::Multiple, vec![0, 2]).validate().is_ok());
        assert!(question(QuestionKind::Multiple, vec![]).validate().is_err());
    }
}
