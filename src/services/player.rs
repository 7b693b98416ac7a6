//! Player-side live-play driver: join a session, wait for the start signal,
//! play questions under their countdowns, and fetch the scored results.
//!
//! All synchronization with the backend happens through short-interval
//! polling; the question poll and the local countdown are independent timers
//! interleaved cooperatively in a single loop.

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::{
    api::{ApiError, PlayBackend},
    dto::{play::JoinRequest, question::Question},
    error::ServiceError,
    scoring::{self, PlayerReport, QuestionMeta, QuestionMetaStore},
    services::poller,
    state::machine::{PlayEffect, PlayEvent, PlayPhase, PlayerStateMachine},
};

/// Timer periods for the live-play loops; tests shrink them to milliseconds.
#[derive(Debug, Clone)]
pub struct PlayerSettings {
    /// Period of the status and question polls.
    pub poll_interval: Duration,
    /// Period of the local countdown tick.
    pub tick_interval: Duration,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Chooses clicks for a player during the answering window.
pub trait AnswerStrategy: Send {
    /// Called once per countdown tick while input is enabled; returning an
    /// option index simulates a click on that option.
    fn pick(&mut self, question: &Question, selection: &[usize], remaining: u32) -> Option<usize>;
}

/// One joined player bound to a session.
pub struct PlayerSession {
    backend: Arc<dyn PlayBackend>,
    meta: Arc<dyn QuestionMetaStore>,
    settings: PlayerSettings,
    player_id: u64,
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("settings", &self.settings)
            .field("player_id", &self.player_id)
            .finish_non_exhaustive()
    }
}

/// Join `session_id` under `name`, validating both before any network call.
pub async fn join(
    backend: Arc<dyn PlayBackend>,
    meta: Arc<dyn QuestionMetaStore>,
    settings: PlayerSettings,
    session_id: &str,
    name: &str,
) -> Result<PlayerSession, ServiceError> {
    if session_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "session id must not be empty".into(),
        ));
    }

    let request = JoinRequest {
        name: name.trim().to_string(),
    };
    request.validate()?;

    let response = backend.join(session_id.trim(), &request).await?;
    info!(player_id = response.player_id, session_id, "joined session");

    Ok(PlayerSession {
        backend,
        meta,
        settings,
        player_id: response.player_id,
    })
}

impl PlayerSession {
    /// Identifier minted by the backend at join time.
    pub fn player_id(&self) -> u64 {
        self.player_id
    }

    /// Drive the session from the waiting room to the results view and
    /// return the scored report.
    pub async fn run(&self, strategy: &mut dyn AnswerStrategy) -> Result<PlayerReport, ServiceError> {
        self.wait_for_start().await;

        let mut machine = PlayerStateMachine::new();
        machine.apply(PlayEvent::GameStarted)?;
        info!(player_id = self.player_id, "session started");

        let mut poll = time::interval(self.settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticker = time::interval_at(
            time::Instant::now() + self.settings.tick_interval,
            self.settings.tick_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !machine.is_over() {
            tokio::select! {
                _ = poll.tick() => {
                    match self.backend.current_question(self.player_id).await {
                        Ok(question) => {
                            let effects = machine.apply(PlayEvent::QuestionReceived(question))?;
                            let fresh = effects
                                .iter()
                                .any(|effect| matches!(effect, PlayEffect::CacheQuestionMeta { .. }));
                            if fresh {
                                // Restart the countdown timer for the new question.
                                ticker.reset();
                            }
                            self.run_effects(&mut machine, effects).await?;
                        }
                        Err(ApiError::RequestStatus { status, .. }) => {
                            // The backend has no "game over" message; a non-OK
                            // question poll is the sole termination signal and is
                            // not distinguished from a genuine server error.
                            info!(player_id = self.player_id, %status, "question poll not OK; session ended");
                            machine.apply(PlayEvent::SessionEnded)?;
                        }
                        Err(err) => {
                            debug!(player_id = self.player_id, error = %err, "question poll failed; retrying");
                        }
                    }
                }
                _ = ticker.tick() => {
                    let effects = machine.apply(PlayEvent::CountdownTick)?;
                    self.run_effects(&mut machine, effects).await?;
                    self.consult_strategy(&mut machine, strategy);
                }
            }
        }

        let records = self.backend.results(self.player_id).await?;
        Ok(scoring::score_results(&records, self.meta.as_ref()))
    }

    /// Poll the status endpoint until the first `started=true` observation.
    ///
    /// Failures are swallowed and retried on the next tick with no backoff
    /// and no retry cap; the poller is then cancelled forever.
    async fn wait_for_start(&self) {
        let (started_tx, mut started_rx) = watch::channel(false);
        let backend = Arc::clone(&self.backend);
        let player_id = self.player_id;

        let handle = poller::spawn(self.settings.poll_interval, move || {
            let backend = Arc::clone(&backend);
            let started_tx = started_tx.clone();
            async move {
                match backend.started(player_id).await {
                    Ok(true) => {
                        let _ = started_tx.send(true);
                        ControlFlow::Break(())
                    }
                    Ok(false) => ControlFlow::Continue(()),
                    Err(err) => {
                        debug!(player_id, error = %err, "status poll failed; retrying");
                        ControlFlow::Continue(())
                    }
                }
            }
        });

        while !*started_rx.borrow() {
            if started_rx.changed().await.is_err() {
                break;
            }
        }
        handle.shutdown().await;
    }

    /// Execute the side effects returned by a transition.
    async fn run_effects(
        &self,
        machine: &mut PlayerStateMachine,
        effects: Vec<PlayEffect>,
    ) -> Result<(), ServiceError> {
        for effect in effects {
            match effect {
                PlayEffect::CacheQuestionMeta {
                    question_id,
                    points,
                    duration,
                } => {
                    self.meta.set(question_id, QuestionMeta { points, duration });
                }
                PlayEffect::FetchCorrectAnswers => {
                    match self.backend.correct_answers(self.player_id).await {
                        Ok(answers) => {
                            machine.apply(PlayEvent::AnswersRevealed(answers))?;
                        }
                        // No retry: the question stays locked without a reveal
                        // until the next question or the end of the session.
                        Err(err) => {
                            warn!(player_id = self.player_id, error = %err, "failed to fetch correct answers");
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Offer the strategy one click while input is enabled.
    fn consult_strategy(&self, machine: &mut PlayerStateMachine, strategy: &mut dyn AnswerStrategy) {
        let (question, selection, remaining) = match machine.phase() {
            PlayPhase::Answering(active) if active.remaining > 0 => (
                active.question.clone(),
                active.selection.clone(),
                active.remaining,
            ),
            _ => return,
        };

        let Some(index) = strategy.pick(&question, &selection, remaining) else {
            return;
        };

        match machine.toggle_option(index) {
            Ok(new_selection) => self.submit_best_effort(new_selection),
            Err(err) => debug!(player_id = self.player_id, index, error = %err, "click rejected"),
        }
    }

    /// Fire-and-forget submission of the full current selection.
    ///
    /// A failed submission is dropped, not retried: the last delivery that
    /// reached the backend before the deadline is authoritative, not the
    /// on-screen selection.
    fn submit_best_effort(&self, selection: Vec<usize>) {
        let backend = Arc::clone(&self.backend);
        let player_id = self.player_id;
        tokio::spawn(async move {
            if let Err(err) = backend.submit_answers(player_id, &selection).await {
                warn!(player_id, error = %err, "answer submission dropped");
            }
        });
    }
}
