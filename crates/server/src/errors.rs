use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ApiError;
use thiserror::Error;
use tracing::{error, warn};

/// Handler failure; the body carries the text the page shows.
#[derive(Debug)]
pub struct PortalError(pub ApiError);

impl From<ApiError> for PortalError {
    fn from(e: ApiError) -> Self {
        PortalError(e)
    }
}

impl PortalError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Server { .. } | ApiError::Transport(_) | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, code = self.0.code(), "backend call failed");
        } else {
            warn!(error = %self.0, code = self.0.code(), "request rejected");
        }
        (status, Json(ErrorBody::new(self.0.user_message()))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
