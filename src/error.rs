//! Service-level error taxonomy.

use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{
        match_engine::InvalidTransition,
        session::{AssemblerError, TrainingDataError},
    },
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<TrainingDataError> for ServiceError {
    fn from(err: TrainingDataError) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<AssemblerError> for ServiceError {
    fn from(err: AssemblerError) -> Self {
        let message = err.to_string();
        match err {
            AssemblerError::ColorTaken(_) | AssemblerError::EmptyDraft => {
                ServiceError::InvalidInput(message)
            }
            AssemblerError::UnknownTeam(_) | AssemblerError::UnknownParticipant(_) => {
                ServiceError::NotFound(message)
            }
            AssemblerError::ColorsExhausted
            | AssemblerError::NoEligibleParticipants
            | AssemblerError::NoDraft => ServiceError::InvalidState(message),
        }
    }
}
