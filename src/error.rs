//! Service-level error types shared by the player and admin flows.

use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    api::ApiError,
    state::machine::{InvalidTransition, SelectionError},
};

/// Errors surfaced by the player and admin service layers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A call to the session-state service failed.
    #[error("backend request failed: {0}")]
    Backend(#[from] ApiError),
    /// Invalid input provided by the caller, rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<SelectionError> for ServiceError {
    fn from(err: SelectionError) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}
