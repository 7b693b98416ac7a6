//! Access layer for the external session-state service.
//!
//! Both sides of the protocol are expressed as traits with boxed-future
//! methods so the service layer can run against scripted in-memory fakes in
//! tests; [`HttpBackend`] is the production implementation.

mod error;
mod http;

use futures::future::BoxFuture;

pub use error::{ApiError, ApiResult};
pub use http::HttpBackend;

use crate::dto::{
    admin::{MutationResponse, MutationType, PlayerRecord, SessionStatus},
    play::{AnswerOutcome, JoinRequest, JoinResponse},
    question::Question,
};

/// Player-facing endpoints of the session-state service.
pub trait PlayBackend: Send + Sync {
    /// `POST /play/join/{sessionId}`.
    fn join(
        &self,
        session_id: &str,
        request: &JoinRequest,
    ) -> BoxFuture<'static, ApiResult<JoinResponse>>;

    /// `GET /play/{playerId}/status`, reduced to the started flag.
    fn started(&self, player_id: u64) -> BoxFuture<'static, ApiResult<bool>>;

    /// `GET /play/{playerId}/question`. A non-OK status is the session's
    /// sole termination signal.
    fn current_question(&self, player_id: u64) -> BoxFuture<'static, ApiResult<Question>>;

    /// `PUT /play/{playerId}/answer` carrying the full current selection.
    fn submit_answers(&self, player_id: u64, answers: &[usize])
    -> BoxFuture<'static, ApiResult<()>>;

    /// `GET /play/{playerId}/answer`, the correct-answer reveal.
    fn correct_answers(&self, player_id: u64) -> BoxFuture<'static, ApiResult<Vec<usize>>>;

    /// `GET /play/{playerId}/results`, ordered by question.
    fn results(&self, player_id: u64) -> BoxFuture<'static, ApiResult<Vec<AnswerOutcome>>>;
}

/// Admin-facing endpoints of the session-state service.
pub trait AdminBackend: Send + Sync {
    /// `POST /admin/game/{gameId}/mutate`.
    fn mutate_session(
        &self,
        game_id: &str,
        mutation: MutationType,
    ) -> BoxFuture<'static, ApiResult<MutationResponse>>;

    /// `GET /admin/session/{sessionId}/status`.
    fn session_status(&self, session_id: &str) -> BoxFuture<'static, ApiResult<SessionStatus>>;

    /// `GET /admin/session/{sessionId}/results`.
    fn session_results(&self, session_id: &str)
    -> BoxFuture<'static, ApiResult<Vec<PlayerRecord>>>;
}
