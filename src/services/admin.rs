//! Admin session control panel: ADVANCE/END mutations, status observation,
//! and results retrieval.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    api::AdminBackend,
    dto::{
        admin::{MutationType, PlayerRecord, SessionStatus},
        question::Question,
    },
    error::ServiceError,
    services::analytics::SessionAnalytics,
};

/// Folds successive status observations into a view of the session,
/// detecting the ended edge and checking the session invariants.
#[derive(Debug, Default)]
pub struct StatusWatch {
    last: Option<SessionStatus>,
    prompt_shown: bool,
}

impl StatusWatch {
    /// Record `status`, returning true when the results prompt should be
    /// surfaced. The prompt fires exactly once, on the first inactive
    /// observation; dismissing it never blocks an explicit results fetch.
    pub fn observe(&mut self, status: &SessionStatus) -> bool {
        if let Some(last) = &self.last {
            // Both invariants are backend-owned; the client only flags
            // violations, it never acts on them.
            if status.active && !last.active {
                warn!("session flipped back to active; invariant violated");
            }
            if last.active && status.active && status.position < last.position {
                warn!(
                    from = last.position,
                    to = status.position,
                    "session position went backwards"
                );
            }
        }

        let prompt = !status.active && !self.prompt_shown;
        if prompt {
            self.prompt_shown = true;
        }
        self.last = Some(status.clone());
        prompt
    }

    /// Last observed status, if any.
    pub fn last(&self) -> Option<&SessionStatus> {
        self.last.as_ref()
    }
}

/// A status refresh plus the one-shot results prompt flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// The freshly observed session status.
    pub status: SessionStatus,
    /// True exactly once, when the ended edge is first observed.
    pub show_results_prompt: bool,
}

/// Control panel over one game's active session.
pub struct SessionController {
    backend: Arc<dyn AdminBackend>,
    game_id: String,
    session_id: String,
    watch: StatusWatch,
}

impl SessionController {
    /// Bind a controller to `game_id` and its running session.
    pub fn new(backend: Arc<dyn AdminBackend>, game_id: String, session_id: String) -> Self {
        Self {
            backend,
            game_id,
            session_id,
            watch: StatusWatch::default(),
        }
    }

    /// Fetch and record the current session status.
    pub async fn refresh(&mut self) -> Result<StatusView, ServiceError> {
        let status = self.backend.session_status(&self.session_id).await?;
        let show_results_prompt = self.watch.observe(&status);
        if show_results_prompt {
            info!(session_id = %self.session_id, "session ended; offering results");
        }
        Ok(StatusView {
            status,
            show_results_prompt,
        })
    }

    /// Start the session or advance it by one question.
    pub async fn advance(&mut self) -> Result<StatusView, ServiceError> {
        self.mutate(MutationType::Advance).await
    }

    /// Irreversibly end the session.
    pub async fn end(&mut self) -> Result<StatusView, ServiceError> {
        self.mutate(MutationType::End).await
    }

    async fn mutate(&mut self, mutation: MutationType) -> Result<StatusView, ServiceError> {
        // Mutations are rejected client-side unless the last observed status
        // is active; no network call is made for an ended session.
        if !self.watch.last().is_some_and(|status| status.active) {
            return Err(ServiceError::InvalidState(
                "no active session, cannot mutate".into(),
            ));
        }

        let response = self
            .backend
            .mutate_session(&self.game_id, mutation)
            .await?;
        debug!(game_id = %self.game_id, ?mutation, status = %response.status, "session mutated");

        // Read-after-mutation keeps the local view authoritative.
        self.refresh().await
    }

    /// Fetch the full roster of player records.
    pub async fn results(&self) -> Result<Vec<PlayerRecord>, ServiceError> {
        Ok(self.backend.session_results(&self.session_id).await?)
    }

    /// Fetch the roster and compute every analytics panel over it, using the
    /// question snapshot from the last observed status for raw points.
    pub async fn results_analytics(&self) -> Result<SessionAnalytics, ServiceError> {
        let records = self.results().await?;
        Ok(SessionAnalytics::compute(&records, self.questions()))
    }

    /// Question snapshot from the last observed status.
    pub fn questions(&self) -> &[Question] {
        self.watch
            .last()
            .map_or(&[], |status| status.questions.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        api::ApiResult,
        dto::{
            admin::MutationResponse,
            play::AnswerOutcome,
            question::{MediaMode, QuestionKind},
        },
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

    fn status(position: i64, active: bool) -> SessionStatus {
        SessionStatus {
            position,
            active,
            questions: vec![question(1, 10), question(2, 20)],
        }
    }

    #[derive(Default)]
    struct FakeInner {
        statuses: Mutex<VecDeque<SessionStatus>>,
        mutate_calls: AtomicUsize,
        status_calls: AtomicUsize,
        roster: Vec<PlayerRecord>,
    }

    #[derive(Clone, Default)]
    struct FakeAdmin(Arc<FakeInner>);

    impl AdminBackend for FakeAdmin {
        fn mutate_session(
            &self,
            _game_id: &str,
            _mutation: MutationType,
        ) -> BoxFuture<'static, ApiResult<MutationResponse>> {
            let inner = Arc::clone(&self.0);
            Box::pin(async move {
                inner.mutate_calls.fetch_add(1, Ordering::SeqCst);
                Ok(MutationResponse {
                    status: serde_json::json!("started"),
                })
            })
        }

        fn session_status(
            &self,
            _session_id: &str,
        ) -> BoxFuture<'static, ApiResult<SessionStatus>> {
            let inner = Arc::clone(&self.0);
            Box::pin(async move {
                inner.status_calls.fetch_add(1, Ordering::SeqCst);
                let mut statuses = inner.statuses.lock().unwrap();
                let front = statuses.front().cloned().expect("status script exhausted");
                if statuses.len() > 1 {
                    statuses.pop_front();
                }
                Ok(front)
            })
        }

        fn session_results(
            &self,
            _session_id: &str,
        ) -> BoxFuture<'static, ApiResult<Vec<PlayerRecord>>> {
            let inner = Arc::clone(&self.0);
            Box::pin(async move { Ok(inner.roster.clone()) })
        }
    }

    fn controller(backend: &FakeAdmin) -> SessionController {
        SessionController::new(Arc::new(backend.clone()), "42".into(), "314159".into())
    }

    #[tokio::test]
    async fn mutations_are_rejected_without_an_active_observation() {
        let backend = FakeAdmin(Arc::new(FakeInner {
            statuses: Mutex::new(VecDeque::from([status(-1, false)])),
            ..Default::default()
        }));
        let mut panel = controller(&backend);

        // Nothing observed yet: reject before any network call.
        let err = panel.advance().await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(backend.0.mutate_calls.load(Ordering::SeqCst), 0);

        // An ended session is observed: still rejected client-side.
        panel.refresh().await.unwrap();
        let err = panel.end().await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(backend.0.mutate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn advance_mutates_then_rereads_the_status() {
        let backend = FakeAdmin(Arc::new(FakeInner {
            statuses: Mutex::new(VecDeque::from([status(-1, true), status(0, true)])),
            ..Default::default()
        }));
        let mut panel = controller(&backend);

        panel.refresh().await.unwrap();
        let view = panel.advance().await.unwrap();

        assert_eq!(backend.0.mutate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.0.status_calls.load(Ordering::SeqCst), 2);
        assert_eq!(view.status.position, 0);
        assert!(!view.show_results_prompt);
    }

    #[tokio::test]
    async fn results_prompt_fires_exactly_once() {
        let backend = FakeAdmin(Arc::new(FakeInner {
            statuses: Mutex::new(VecDeque::from([
                status(1, true),
                status(1, false),
                status(1, false),
            ])),
            ..Default::default()
        }));
        let mut panel = controller(&backend);

        assert!(!panel.refresh().await.unwrap().show_results_prompt);
        assert!(panel.refresh().await.unwrap().show_results_prompt);
        assert!(!panel.refresh().await.unwrap().show_results_prompt);
    }

    #[tokio::test]
    async fn prompt_fires_when_the_first_observation_is_already_ended() {
        let backend = FakeAdmin(Arc::new(FakeInner {
            statuses: Mutex::new(VecDeque::from([status(2, false)])),
            ..Default::default()
        }));
        let mut panel = controller(&backend);

        assert!(panel.refresh().await.unwrap().show_results_prompt);
    }

    #[tokio::test]
    async fn analytics_use_the_observed_question_snapshot() {
        let roster = vec![PlayerRecord {
            name: "A".into(),
            answers: vec![
                AnswerOutcome {
                    correct: true,
                    ..Default::default()
                },
                AnswerOutcome {
                    correct: true,
                    ..Default::default()
                },
            ],
        }];
        let backend = FakeAdmin(Arc::new(FakeInner {
            statuses: Mutex::new(VecDeque::from([status(2, false)])),
            roster,
            ..Default::default()
        }));
        let mut panel = controller(&backend);
        panel.refresh().await.unwrap();

        let analytics = panel.results_analytics().await.unwrap();
        // Raw points: 10 + 20 from the snapshot, no speed decay.
        assert_eq!(analytics.leaderboard[0].score, 30);
        assert_eq!(analytics.leaderboard[0].badge, "💯");
    }

    #[test]
    fn status_watch_tracks_invariants_without_acting_on_them() {
        let mut watch = StatusWatch::default();
        assert!(!watch.observe(&status(0, true)));
        // Regression and resurrection only log; observation still succeeds.
        assert!(!watch.observe(&status(-1, true)));
        assert!(watch.observe(&status(1, false)));
        assert!(!watch.observe(&status(1, true)));
        assert_eq!(watch.last().unwrap().position, 1);
    }
}
