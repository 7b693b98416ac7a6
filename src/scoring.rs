//! Speed-decayed score computation for the player results view.
//!
//! The results feed carries correctness and raw timestamps only, so the
//! points and duration of each question come from a per-question metadata
//! cache populated while playing. The cache is an injected key-value store
//! rather than ambient global state.

use dashmap::DashMap;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::dto::play::AnswerOutcome;

/// Per-question metadata cached during play; the results feed omits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionMeta {
    /// Raw points for a correct answer.
    pub points: u32,
    /// Answer window in seconds.
    pub duration: u32,
}

/// Injected key-value store for the per-question metadata cache.
pub trait QuestionMetaStore: Send + Sync {
    /// Look up the cached metadata for a question id.
    fn get(&self, question_id: u64) -> Option<QuestionMeta>;

    /// Persist metadata for a question id, overwriting any prior entry.
    fn set(&self, question_id: u64, meta: QuestionMeta);
}

/// In-memory metadata store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryMetaStore {
    entries: DashMap<u64, QuestionMeta>,
}

impl InMemoryMetaStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuestionMetaStore for InMemoryMetaStore {
    fn get(&self, question_id: u64) -> Option<QuestionMeta> {
        self.entries.get(&question_id).map(|entry| *entry)
    }

    fn set(&self, question_id: u64, meta: QuestionMeta) {
        self.entries.insert(question_id, meta);
    }
}

/// Scored outcome of one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionScore {
    /// Whether the delivered selection was correct.
    pub correct: bool,
    /// Seconds between question start and the answer, when both timestamps
    /// parse; `None` renders as "N/A" and contributes nothing to the score.
    pub time_taken: Option<f64>,
    /// Points earned after the speed decay, rounded to one decimal.
    pub earned: f64,
}

impl QuestionScore {
    /// Response time as displayed.
    pub fn time_taken_label(&self) -> String {
        match self.time_taken {
            Some(taken) => format!("{taken:.2}s"),
            None => "N/A".into(),
        }
    }
}

/// Scored results for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerReport {
    /// Per-question outcomes in feed order.
    pub questions: Vec<QuestionScore>,
    /// Sum of the earned scores.
    pub total: f64,
}

/// Round to one decimal place, the resolution scores are displayed at.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Seconds elapsed between two RFC 3339 timestamps, if both parse.
pub(crate) fn seconds_between(start: Option<&str>, end: Option<&str>) -> Option<f64> {
    let start = OffsetDateTime::parse(start?, &Rfc3339).ok()?;
    let end = OffsetDateTime::parse(end?, &Rfc3339).ok()?;
    Some((end - start).as_seconds_f64())
}

/// Score a player's raw answer records against the cached question metadata.
///
/// Records are matched to cache entries by 1-based ordinal, matching the
/// feed's by-question ordering and the monotonic question ids. A missing
/// cache entry scores the question with zero points and zero duration.
///
/// A correct answer earns `points * remaining / 60` where `remaining` is the
/// unspent part of the answer window in seconds: points scale with the
/// remaining time expressed in minutes, so a question shorter than a minute
/// yields less than its full points even for an instant answer.
pub fn score_results(records: &[AnswerOutcome], meta: &dyn QuestionMetaStore) -> PlayerReport {
    let mut questions = Vec::with_capacity(records.len());
    let mut total = 0.0;

    for (position, record) in records.iter().enumerate() {
        let ordinal = (position + 1) as u64;
        let QuestionMeta { points, duration } = meta.get(ordinal).unwrap_or_default();

        let time_taken = seconds_between(
            record.question_started_at.as_deref(),
            record.answered_at.as_deref(),
        );

        let earned = match (record.correct, time_taken) {
            (true, Some(taken)) => {
                let remaining = (f64::from(duration) - taken).max(0.0);
                round1(f64::from(points) * (remaining / 60.0))
            }
            _ => 0.0,
        };

        total += earned;
        questions.push(QuestionScore {
            correct: record.correct,
            time_taken,
            earned,
        });
    }

    PlayerReport { questions, total }
}
