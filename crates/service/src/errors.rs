use thiserror::Error;

use models::errors::ModelError;

/// Failure of one backend operation.
///
/// `Clone` because a single failed request is handed to every caller that
/// joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized(Option<String>),
    #[error("forbidden")]
    Forbidden(Option<String>),
    #[error("not found")]
    NotFound(Option<String>),
    #[error("server error {status}")]
    Server { status: u16, message: Option<String> },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Coarse grouping pages use to pick a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    NotFound,
    Transport,
}

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

impl ApiError {
    /// Map a non-2xx status plus the server-provided message, if any.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            400 | 422 => ApiError::Validation(message.unwrap_or_else(|| "invalid request".into())),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Server { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Unauthorized(_) | ApiError::Forbidden(_) => ErrorKind::Unauthorized,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Server { .. } | ApiError::Transport(_) | ApiError::Timeout | ApiError::Decode(_) => {
                ErrorKind::Transport
            }
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// Text a page shows: the server's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Unauthorized(msg) => msg.clone().unwrap_or_else(|| "You are not signed in.".into()),
            ApiError::Forbidden(msg) => msg.clone().unwrap_or_else(|| "Access denied.".into()),
            ApiError::NotFound(msg) => msg.clone().unwrap_or_else(|| "Not found.".into()),
            ApiError::Server { message: Some(msg), .. } => msg.clone(),
            ApiError::Server { message: None, .. }
            | ApiError::Transport(_)
            | ApiError::Timeout
            | ApiError::Decode(_) => GENERIC_FAILURE.into(),
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 1001,
            ApiError::Unauthorized(_) => 1004,
            ApiError::Forbidden(_) => 1005,
            ApiError::NotFound(_) => 1003,
            ApiError::Server { .. } => 1200,
            ApiError::Transport(_) => 1300,
            ApiError::Timeout => 1301,
            ApiError::Decode(_) => 1302,
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
