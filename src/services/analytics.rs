//! Aggregated analytics for the admin results view.
//!
//! All functions are pure over the roster returned by the session results
//! endpoint. The leaderboard sums raw question points for correct answers;
//! unlike the player-side report it applies no speed decay.

use std::cmp::Ordering;

use crate::{
    dto::{admin::PlayerRecord, question::Question},
    scoring::{round1, seconds_between},
};

/// One row of the top-5 leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Rank 1..=5 in descending score order.
    pub rank: usize,
    /// Player display name.
    pub name: String,
    /// Sum of raw points over correctly answered questions.
    pub score: u32,
    /// Performance badge, possibly empty.
    pub badge: &'static str,
}

/// A player's overall accuracy, for the accuracy ranking table.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyEntry {
    /// Player display name.
    pub name: String,
    /// Percentage of questions answered correctly, one decimal.
    pub accuracy: f64,
}

/// The quickest responder to one question.
#[derive(Debug, Clone, PartialEq)]
pub struct FastestResponder {
    /// Player display name.
    pub name: String,
    /// Response time in seconds.
    pub seconds: f64,
}

/// All analytics panels for the admin results view.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAnalytics {
    /// Top-5 leaderboard on raw points.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Per-question correctness rate in percent, one decimal.
    pub correct_rates: Vec<f64>,
    /// Per-question mean response time in seconds, over players who answered.
    pub average_times: Vec<Option<f64>>,
    /// Players ranked by accuracy, descending.
    pub accuracy: Vec<AccuracyEntry>,
    /// Per-question fastest responder, when any timestamps parsed.
    pub fastest: Vec<Option<FastestResponder>>,
}

impl SessionAnalytics {
    /// Compute every panel over the full roster.
    pub fn compute(records: &[PlayerRecord], questions: &[Question]) -> Self {
        Self {
            leaderboard: leaderboard(records, questions),
            correct_rates: correct_rate_per_question(records),
            average_times: average_response_times(records),
            accuracy: accuracy_ranking(records),
            fastest: fastest_responders(records),
        }
    }

    /// Render the leaderboard as CSV.
    pub fn csv(&self) -> String {
        leaderboard_csv(&self.leaderboard)
    }
}

/// Badge awarded from the share of correct answers.
fn badge_for(correct: usize, total: usize) -> &'static str {
    if correct == total {
        "💯"
    } else if (correct as f64) >= (total as f64) * 0.8 {
        "🎯"
    } else if correct <= 1 {
        "😴"
    } else {
        ""
    }
}

/// Number of questions in the roster, taken from the first player's record.
fn question_count(records: &[PlayerRecord]) -> usize {
    records.first().map_or(0, |player| player.answers.len())
}

/// Build the top-5 leaderboard from raw question points.
///
/// Correct answers earn the question's full point value regardless of
/// response time. The sort is stable so ties keep roster order, and dense
/// ranks 1..=5 are assigned after truncation.
pub fn leaderboard(records: &[PlayerRecord], questions: &[Question]) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(String, u32, &'static str)> = records
        .iter()
        .map(|player| {
            let mut score = 0u32;
            let mut correct = 0usize;
            for (index, answer) in player.answers.iter().enumerate() {
                if answer.correct {
                    score += questions.get(index).map_or(0, |question| question.points);
                    correct += 1;
                }
            }
            (
                player.name.clone(),
                score,
                badge_for(correct, player.answers.len()),
            )
        })
        .collect();

    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(5);
    rows.into_iter()
        .enumerate()
        .map(|(index, (name, score, badge))| LeaderboardEntry {
            rank: index + 1,
            name,
            score,
            badge,
        })
        .collect()
}

/// Percentage of players answering each question correctly, one decimal.
pub fn correct_rate_per_question(records: &[PlayerRecord]) -> Vec<f64> {
    let total = records.len();
    (0..question_count(records))
        .map(|index| {
            let correct = records
                .iter()
                .filter(|player| player.answers.get(index).is_some_and(|a| a.correct))
                .count();
            round1(100.0 * correct as f64 / total as f64)
        })
        .collect()
}

/// Mean response time in seconds per question, over players who answered;
/// missing answers and unparsable timestamps are skipped.
pub fn average_response_times(records: &[PlayerRecord]) -> Vec<Option<f64>> {
    (0..question_count(records))
        .map(|index| {
            let times: Vec<f64> = records
                .iter()
                .filter_map(|player| player.answers.get(index))
                .filter_map(|answer| {
                    seconds_between(
                        answer.question_started_at.as_deref(),
                        answer.answered_at.as_deref(),
                    )
                })
                .collect();

            if times.is_empty() {
                None
            } else {
                Some(times.iter().sum::<f64>() / times.len() as f64)
            }
        })
        .collect()
}

/// Players ranked by overall accuracy percentage, descending and stable.
pub fn accuracy_ranking(records: &[PlayerRecord]) -> Vec<AccuracyEntry> {
    let mut rows: Vec<AccuracyEntry> = records
        .iter()
        .map(|player| {
            let total = player.answers.len();
            let correct = player.answers.iter().filter(|a| a.correct).count();
            let accuracy = if total == 0 {
                0.0
            } else {
                round1(100.0 * correct as f64 / total as f64)
            };
            AccuracyEntry {
                name: player.name.clone(),
                accuracy,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.accuracy.partial_cmp(&a.accuracy).unwrap_or(Ordering::Equal));
    rows
}

/// Fastest responder for each question, if any player's timestamps parsed.
pub fn fastest_responders(records: &[PlayerRecord]) -> Vec<Option<FastestResponder>> {
    (0..question_count(records))
        .map(|index| {
            let mut fastest: Option<FastestResponder> = None;
            for player in records {
                let Some(answer) = player.answers.get(index) else {
                    continue;
                };
                let Some(seconds) = seconds_between(
                    answer.question_started_at.as_deref(),
                    answer.answered_at.as_deref(),
                ) else {
                    continue;
                };
                if fastest.as_ref().is_none_or(|entry| seconds < entry.seconds) {
                    fastest = Some(FastestResponder {
                        name: player.name.clone(),
                        seconds,
                    });
                }
            }
            fastest
        })
        .collect()
}

/// Render leaderboard rows as CSV with the `Rank,Name,Score,Badge` header.
pub fn leaderboard_csv(entries: &[LeaderboardEntry]) -> String {
    let mut lines = vec!["Rank,Name,Score,Badge".to_string()];
    lines.extend(
        entries
            .iter()
            .map(|entry| format!("{},{},{},{}", entry.rank, entry.name, entry.score, entry.badge)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{
        play::AnswerOutcome,
        question::{MediaMode, QuestionKind},
    };

    fn question(id: u64, points: u32) -> Question {
        Question {
            id,
            text: format!("question {id}"),
            kind: QuestionKind::Single,
            duration: 30,
            points,
            option_answers: vec!["a".into(), "b".into()],
            correct_answers: vec![0],
            media: String::new(),
            media_mode: MediaMode::Url,
            image_data: String::new(),
        }
    }

    fn answer(correct: bool, start: &str, end: &str) -> AnswerOutcome {
        AnswerOutcome {
            correct,
            question_started_at: Some(start.to_string()),
            answered_at: Some(end.to_string()),
        }
    }

    fn untimed(correct: bool) -> AnswerOutcome {
        AnswerOutcome {
            correct,
            question_started_at: None,
            answered_at: None,
        }
    }

    fn record(name: &str, answers: Vec<AnswerOutcome>) -> PlayerRecord {
        PlayerRecord {
            name: name.into(),
            answers,
        }
    }

    #[test]
    fn leaderboard_uses_raw_points_not_decayed_scores() {
        let questions = [question(1, 10), question(2, 20)];
        // A answers Q1 correctly after almost the whole window; raw points
        // ignore the timing entirely.
        let records = [
            record(
                "A",
                vec![
                    answer(true, "2025-05-01T10:00:00Z", "2025-05-01T10:00:29Z"),
                    untimed(false),
                ],
            ),
            record(
                "B",
                vec![
                    answer(true, "2025-05-01T10:00:00Z", "2025-05-01T10:00:02Z"),
                    answer(true, "2025-05-01T10:01:00Z", "2025-05-01T10:01:05Z"),
                ],
            ),
        ];

        let board = leaderboard(&records, &questions);
        assert_eq!(board.len(), 2);
        assert_eq!((board[0].name.as_str(), board[0].score, board[0].rank), ("B", 30, 1));
        assert_eq!((board[1].name.as_str(), board[1].score, board[1].rank), ("A", 10, 2));
    }

    #[test]
    fn leaderboard_ties_keep_roster_order() {
        let questions = [question(1, 10)];
        let records = [
            record("first", vec![untimed(true)]),
            record("second", vec![untimed(true)]),
        ];

        let board = leaderboard(&records, &questions);
        assert_eq!(board[0].name, "first");
        assert_eq!(board[1].name, "second");
    }

    #[test]
    fn leaderboard_truncates_to_five() {
        let questions = [question(1, 10)];
        let records: Vec<PlayerRecord> = (0..7)
            .map(|i| record(&format!("p{i}"), vec![untimed(true)]))
            .collect();

        let board = leaderboard(&records, &questions);
        assert_eq!(board.len(), 5);
        assert_eq!(board.last().unwrap().rank, 5);
    }

    #[test]
    fn badges_reflect_the_share_of_correct_answers() {
        let questions: Vec<Question> = (1..=5).map(|id| question(id, 10)).collect();
        let all = vec![untimed(true); 5];
        let four = vec![untimed(true), untimed(true), untimed(true), untimed(true), untimed(false)];
        let one = vec![untimed(true), untimed(false), untimed(false), untimed(false), untimed(false)];
        let three = vec![untimed(true), untimed(true), untimed(true), untimed(false), untimed(false)];

        let records = [
            record("perfect", all),
            record("sharp", four),
            record("sleepy", one),
            record("middling", three),
        ];

        let board = leaderboard(&records, &questions);
        let badge_of = |name: &str| {
            board
                .iter()
                .find(|entry| entry.name == name)
                .unwrap()
                .badge
        };
        assert_eq!(badge_of("perfect"), "💯");
        assert_eq!(badge_of("sharp"), "🎯");
        assert_eq!(badge_of("sleepy"), "😴");
        assert_eq!(badge_of("middling"), "");
    }

    #[test]
    fn csv_header_is_exact() {
        let questions = [question(1, 10)];
        let records = [record("A", vec![untimed(true)])];
        let csv = leaderboard_csv(&leaderboard(&records, &questions));

        assert_eq!(csv.lines().next().unwrap(), "Rank,Name,Score,Badge");
        assert_eq!(csv.lines().nth(1).unwrap(), "1,A,10,💯");
    }

    #[test]
    fn correct_rates_have_one_decimal() {
        let records = [
            record("A", vec![untimed(true)]),
            record("B", vec![untimed(true)]),
            record("C", vec![untimed(false)]),
        ];

        // 2 of 3 correct -> 66.7 after rounding
        assert_eq!(correct_rate_per_question(&records), vec![66.7]);
    }

    #[test]
    fn average_times_skip_missing_answers() {
        let records = [
            record(
                "A",
                vec![answer(true, "2025-05-01T10:00:00Z", "2025-05-01T10:00:04Z")],
            ),
            record(
                "B",
                vec![answer(false, "2025-05-01T10:00:00Z", "2025-05-01T10:00:08Z")],
            ),
            record("C", vec![untimed(false)]),
        ];

        let averages = average_response_times(&records);
        assert_eq!(averages, vec![Some(6.0)]);
    }

    #[test]
    fn average_times_are_none_when_nobody_answered() {
        let records = [record("A", vec![untimed(false)])];
        assert_eq!(average_response_times(&records), vec![None]);
    }

    #[test]
    fn accuracy_ranking_sorts_descending() {
        let records = [
            record("half", vec![untimed(true), untimed(false)]),
            record("full", vec![untimed(true), untimed(true)]),
        ];

        let ranking = accuracy_ranking(&records);
        assert_eq!(ranking[0].name, "full");
        assert_eq!(ranking[0].accuracy, 100.0);
        assert_eq!(ranking[1].accuracy, 50.0);
    }

    #[test]
    fn fastest_responder_takes_the_minimum() {
        let records = [
            record(
                "slow",
                vec![answer(true, "2025-05-01T10:00:00Z", "2025-05-01T10:00:09Z")],
            ),
            record(
                "quick",
                vec![answer(false, "2025-05-01T10:00:00Z", "2025-05-01T10:00:02Z")],
            ),
        ];

        let fastest = fastest_responders(&records);
        let entry = fastest[0].as_ref().unwrap();
        assert_eq!(entry.name, "quick");
        assert_eq!(entry.seconds, 2.0);
    }

    #[test]
    fn analytics_bundle_matches_panel_functions() {
        let questions = [question(1, 10)];
        let records = [record("A", vec![untimed(true)])];

        let analytics = SessionAnalytics::compute(&records, &questions);
        assert_eq!(analytics.leaderboard, leaderboard(&records, &questions));
        assert_eq!(analytics.correct_rates, vec![100.0]);
        assert!(analytics.csv().starts_with("Rank,Name,Score,Badge"));
    }
}
