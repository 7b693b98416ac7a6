//! Pure state machine driving one player's live-play lifecycle.
//!
//! The machine owns no timers and performs no I/O: the service layer feeds it
//! poll results and countdown ticks as events, and executes the effects each
//! transition returns. Question identity (never a shared counter) is the sole
//! guard against setting up the same question twice.

use thiserror::Error;

use crate::dto::question::Question;

/// Phases a player moves through across the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayPhase {
    /// Joined; the admin has not started the session yet.
    WaitingForStart,
    /// Session started; no question delivered yet.
    AwaitingQuestion,
    /// A question is on screen and its countdown is running.
    Answering(ActiveQuestion),
    /// Countdown expired and the correct answers are on screen.
    Locked(RevealedQuestion),
    /// Session over; the results view takes over.
    Results,
}

/// The question currently on screen together with its live countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuestion {
    /// Question as delivered by the poll.
    pub question: Question,
    /// Seconds left before input locks.
    pub remaining: u32,
    /// Current selection with the most recent click applied.
    pub selection: Vec<usize>,
}

/// A locked question with the revealed correct answer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedQuestion {
    /// Question that just expired.
    pub question: Question,
    /// Selection as it stood when input locked.
    pub selection: Vec<usize>,
    /// Correct option indices fetched after expiry.
    pub correct_answers: Vec<usize>,
}

/// Events applied to the player state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayEvent {
    /// First `started=true` status observation.
    GameStarted,
    /// The question poll returned a question (possibly the one on screen).
    QuestionReceived(Question),
    /// One countdown second elapsed.
    CountdownTick,
    /// Correct answers fetched after the countdown expired.
    AnswersRevealed(Vec<usize>),
    /// The question poll returned a non-OK status.
    SessionEnded,
}

/// Side effects the caller must execute after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayEffect {
    /// Persist `{points, duration}` for the question into the meta store;
    /// the results feed does not carry them.
    CacheQuestionMeta {
        /// Identifier of the freshly delivered question.
        question_id: u64,
        /// Raw points for a correct answer.
        points: u32,
        /// Answer window in seconds.
        duration: u32,
    },
    /// Fetch the correct answers for the question on screen. Emitted exactly
    /// once per question, on the countdown's expiry edge.
    FetchCorrectAnswers,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: PlayPhase,
    /// The event that cannot be applied from this phase.
    pub event: PlayEvent,
}

/// Error raised when a click cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// No question is on screen.
    #[error("no question is currently accepting answers")]
    NotAnswering,
    /// The countdown reached zero or the answers were revealed.
    #[error("input is locked")]
    InputLocked,
    /// The clicked index does not name an option.
    #[error("option index {index} out of range ({options} options)")]
    OutOfRange {
        /// The clicked index.
        index: usize,
        /// Number of options the question offers.
        options: usize,
    },
}

/// State machine implementing the player-side flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStateMachine {
    phase: PlayPhase,
}

impl Default for PlayerStateMachine {
    fn default() -> Self {
        Self {
            phase: PlayPhase::WaitingForStart,
        }
    }
}

impl PlayerStateMachine {
    /// Create a new state machine waiting for the session to start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &PlayPhase {
        &self.phase
    }

    /// True once the machine has reached the results view.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, PlayPhase::Results)
    }

    /// Apply `event`, returning the side effects the caller must execute.
    pub fn apply(&mut self, event: PlayEvent) -> Result<Vec<PlayEffect>, InvalidTransition> {
        match event {
            PlayEvent::GameStarted => {
                if matches!(self.phase, PlayPhase::WaitingForStart) {
                    self.phase = PlayPhase::AwaitingQuestion;
                    Ok(Vec::new())
                } else {
                    Err(self.invalid(PlayEvent::GameStarted))
                }
            }
            PlayEvent::QuestionReceived(question) => match &self.phase {
                PlayPhase::AwaitingQuestion => Ok(self.enter_question(question)),
                PlayPhase::Answering(active) if active.question.id == question.id => Ok(Vec::new()),
                PlayPhase::Locked(locked) if locked.question.id == question.id => Ok(Vec::new()),
                PlayPhase::Answering(_) | PlayPhase::Locked(_) => Ok(self.enter_question(question)),
                PlayPhase::WaitingForStart | PlayPhase::Results => {
                    Err(self.invalid(PlayEvent::QuestionReceived(question)))
                }
            },
            PlayEvent::CountdownTick => match &mut self.phase {
                PlayPhase::Answering(active) => {
                    if active.remaining == 0 {
                        return Ok(Vec::new());
                    }
                    active.remaining -= 1;
                    if active.remaining == 0 {
                        Ok(vec![PlayEffect::FetchCorrectAnswers])
                    } else {
                        Ok(Vec::new())
                    }
                }
                // The poll and tick timers drift independently; stray ticks
                // outside an active countdown are harmless.
                PlayPhase::AwaitingQuestion | PlayPhase::Locked(_) | PlayPhase::Results => {
                    Ok(Vec::new())
                }
                PlayPhase::WaitingForStart => Err(self.invalid(PlayEvent::CountdownTick)),
            },
            PlayEvent::AnswersRevealed(correct_answers) => {
                let PlayPhase::Answering(active) = &self.phase else {
                    return Err(self.invalid(PlayEvent::AnswersRevealed(correct_answers)));
                };
                if active.remaining > 0 {
                    return Err(self.invalid(PlayEvent::AnswersRevealed(correct_answers)));
                }

                let revealed = RevealedQuestion {
                    question: active.question.clone(),
                    selection: active.selection.clone(),
                    correct_answers,
                };
                self.phase = PlayPhase::Locked(revealed);
                Ok(Vec::new())
            }
            PlayEvent::SessionEnded => match &self.phase {
                PlayPhase::AwaitingQuestion | PlayPhase::Answering(_) | PlayPhase::Locked(_) => {
                    self.phase = PlayPhase::Results;
                    Ok(Vec::new())
                }
                PlayPhase::Results => Ok(Vec::new()),
                PlayPhase::WaitingForStart => Err(self.invalid(PlayEvent::SessionEnded)),
            },
        }
    }

    /// Apply a click on `index`, returning the full selection to submit.
    pub fn toggle_option(&mut self, index: usize) -> Result<Vec<usize>, SelectionError> {
        match &mut self.phase {
            PlayPhase::Answering(active) => {
                if active.remaining == 0 {
                    return Err(SelectionError::InputLocked);
                }
                let options = active.question.option_answers.len();
                if index >= options {
                    return Err(SelectionError::OutOfRange { index, options });
                }

                active.selection = active.question.kind.toggle(&active.selection, index);
                Ok(active.selection.clone())
            }
            PlayPhase::Locked(_) => Err(SelectionError::InputLocked),
            _ => Err(SelectionError::NotAnswering),
        }
    }

    /// Set up a freshly delivered question: reset the countdown, clear the
    /// selection and any revealed answers, and cache the question metadata.
    fn enter_question(&mut self, question: Question) -> Vec<PlayEffect> {
        let mut effects = vec![PlayEffect::CacheQuestionMeta {
            question_id: question.id,
            points: question.points,
            duration: question.duration,
        }];
        if question.duration == 0 {
            effects.push(PlayEffect::FetchCorrectAnswers);
        }

        self.phase = PlayPhase::Answering(ActiveQuestion {
            remaining: question.duration,
            selection: Vec::new(),
            question,
        });
        effects
    }

    fn invalid(&self, event: PlayEvent) -> InvalidTransition {
        InvalidTransition {
            from: self.phase.clone(),
            event,
        }
    }
}
