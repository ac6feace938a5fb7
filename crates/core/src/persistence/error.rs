//! Persistence error types.

use amortis_shared::AppError;
use thiserror::Error;

use super::types::{ScheduleBasis, ScheduleOwner};
use crate::amortization::AmortizationError;

/// Errors raised by a schedule repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// A schedule already exists for the owner and basis.
    #[error("{basis} schedule already exists for {owner}")]
    AlreadyExists {
        /// Owning record.
        owner: ScheduleOwner,
        /// Book or tax.
        basis: ScheduleBasis,
    },

    /// No schedule exists for the owner and basis.
    #[error("no {basis} schedule for {owner}")]
    NotFound {
        /// Owning record.
        owner: ScheduleOwner,
        /// Book or tax.
        basis: ScheduleBasis,
    },

    /// Storage backend failed.
    #[error("repository error: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyExists { .. } => "SCHEDULE_EXISTS",
            Self::NotFound { .. } => "SCHEDULE_NOT_FOUND",
            Self::Backend(_) => "REPOSITORY_ERROR",
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepositoryError::Backend(message) => Self::Internal(message),
        }
    }
}

/// Errors raised by the schedule service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleServiceError {
    /// The terms do not describe a valid schedule.
    #[error(transparent)]
    Amortization(#[from] AmortizationError),

    /// Storage rejected or failed the operation.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ScheduleServiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Amortization(err) => err.error_code(),
            Self::Repository(err) => err.error_code(),
        }
    }
}

impl From<ScheduleServiceError> for AppError {
    fn from(err: ScheduleServiceError) -> Self {
        match err {
            ScheduleServiceError::Amortization(inner) => inner.into(),
            ScheduleServiceError::Repository(inner) => inner.into(),
        }
    }
}
