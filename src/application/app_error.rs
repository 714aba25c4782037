use thiserror::Error;

use crate::domain::entities::webhook_event::EventParseError;
use crate::infra::signature::VerificationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MalformedRequest(String),

    #[error("Webhook signature verification failed: {0}")]
    VerificationFailed(String),

    #[error("Profile not found for customer {0}")]
    ProfileNotFound(String),

    #[error("Profile lookup failed: {0}")]
    ProfileLookupFailed(String),

    #[error("Failed to update subscription: {0}")]
    StorageUpdateFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    MalformedRequest,
    VerificationFailed,
    ProfileNotFound,
    ProfileLookupFailed,
    StorageUpdateFailed,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MalformedRequest => "MALFORMED_REQUEST",
            ErrorCode::VerificationFailed => "VERIFICATION_FAILED",
            ErrorCode::ProfileNotFound => "PROFILE_NOT_FOUND",
            ErrorCode::ProfileLookupFailed => "PROFILE_LOOKUP_FAILED",
            ErrorCode::StorageUpdateFailed => "STORAGE_UPDATE_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MalformedRequest(_) => ErrorCode::MalformedRequest,
            AppError::VerificationFailed(_) => ErrorCode::VerificationFailed,
            AppError::ProfileNotFound(_) => ErrorCode::ProfileNotFound,
            AppError::ProfileLookupFailed(_) => ErrorCode::ProfileLookupFailed,
            AppError::StorageUpdateFailed(_) => ErrorCode::StorageUpdateFailed,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match err {
            // A structurally broken header is a malformed request, not a forged one.
            VerificationError::MalformedHeader(_) => AppError::MalformedRequest(err.to_string()),
            VerificationError::NoMatchingSignature | VerificationError::StaleTimestamp { .. } => {
                AppError::VerificationFailed(err.to_string())
            }
            VerificationError::InvalidKey => AppError::Internal(err.to_string()),
        }
    }
}

impl From<EventParseError> for AppError {
    fn from(err: EventParseError) -> Self {
        AppError::MalformedRequest(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
