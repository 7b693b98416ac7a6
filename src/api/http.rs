//! `reqwest` implementation of the backend traits.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};

use crate::dto::{
    admin::{
        MutationRequest, MutationResponse, MutationType, PlayerRecord, SessionResultsEnvelope,
        SessionStatus, SessionStatusEnvelope,
    },
    play::{
        AnswerOutcome, AnswerSubmission, CorrectAnswers, JoinRequest, JoinResponse,
        QuestionEnvelope, StatusResponse,
    },
    question::Question,
};

use super::{
    AdminBackend, PlayBackend,
    error::{ApiError, ApiResult, ErrorBody},
};

/// HTTP client for the session-state service.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Arc<str>,
}

impl HttpBackend {
    /// Build a client against `base_url` (scheme and authority; a trailing
    /// slash is tolerated).
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| ApiError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Send a request and surface a non-success status as an error, decoding
    /// the backend's best-effort `{error}` body into the message.
    async fn check(response: reqwest::Response, path: &str) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.error);
        Err(ApiError::RequestStatus {
            path: path.to_string(),
            status,
            message,
        })
    }

    async fn get_json<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|source| ApiError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let response = Self::check(response, path).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: ?Sized + Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, path)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let response = Self::check(response, path).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    /// Send a request whose response body carries nothing the client needs.
    async fn send_expect_ok<B>(&self, method: Method, path: &str, body: &B) -> ApiResult<()>
    where
        B: ?Sized + Serialize,
    {
        let response = self
            .request(method, path)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        Self::check(response, path).await.map(|_| ())
    }
}

impl PlayBackend for HttpBackend {
    fn join(
        &self,
        session_id: &str,
        request: &JoinRequest,
    ) -> BoxFuture<'static, ApiResult<JoinResponse>> {
        let backend = self.clone();
        let path = format!("play/join/{session_id}");
        let request = request.clone();
        Box::pin(async move { backend.send_json(Method::POST, &path, &request).await })
    }

    fn started(&self, player_id: u64) -> BoxFuture<'static, ApiResult<bool>> {
        let backend = self.clone();
        let path = format!("play/{player_id}/status");
        Box::pin(async move {
            let response: StatusResponse = backend.get_json(&path).await?;
            Ok(response.started)
        })
    }

    fn current_question(&self, player_id: u64) -> BoxFuture<'static, ApiResult<Question>> {
        let backend = self.clone();
        let path = format!("play/{player_id}/question");
        Box::pin(async move {
            let envelope: QuestionEnvelope = backend.get_json(&path).await?;
            Ok(envelope.question)
        })
    }

    fn submit_answers(
        &self,
        player_id: u64,
        answers: &[usize],
    ) -> BoxFuture<'static, ApiResult<()>> {
        let backend = self.clone();
        let path = format!("play/{player_id}/answer");
        let submission = AnswerSubmission {
            answers: answers.to_vec(),
        };
        Box::pin(async move { backend.send_expect_ok(Method::PUT, &path, &submission).await })
    }

    fn correct_answers(&self, player_id: u64) -> BoxFuture<'static, ApiResult<Vec<usize>>> {
        let backend = self.clone();
        let path = format!("play/{player_id}/answer");
        Box::pin(async move {
            let reveal: CorrectAnswers = backend.get_json(&path).await?;
            Ok(reveal.answers)
        })
    }

    fn results(&self, player_id: u64) -> BoxFuture<'static, ApiResult<Vec<AnswerOutcome>>> {
        let backend = self.clone();
        let path = format!("play/{player_id}/results");
        Box::pin(async move { backend.get_json(&path).await })
    }
}

impl AdminBackend for HttpBackend {
    fn mutate_session(
        &self,
        game_id: &str,
        mutation: MutationType,
    ) -> BoxFuture<'static, ApiResult<MutationResponse>> {
        let backend = self.clone();
        let path = format!("admin/game/{game_id}/mutate");
        let request = MutationRequest {
            mutation_type: mutation,
        };
        Box::pin(async move { backend.send_json(Method::POST, &path, &request).await })
    }

    fn session_status(&self, session_id: &str) -> BoxFuture<'static, ApiResult<SessionStatus>> {
        let backend = self.clone();
        let path = format!("admin/session/{session_id}/status");
        Box::pin(async move {
            let envelope: SessionStatusEnvelope = backend.get_json(&path).await?;
            Ok(envelope.results)
        })
    }

    fn session_results(
        &self,
        session_id: &str,
    ) -> BoxFuture<'static, ApiResult<Vec<PlayerRecord>>> {
        let backend = self.clone();
        let path = format!("admin/session/{session_id}/results");
        Box::pin(async move {
            let envelope: SessionResultsEnvelope = backend.get_json(&path).await?;
            Ok(envelope.results)
        })
    }
}
