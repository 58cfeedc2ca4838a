// src/error.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::services::completion::CompletionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("upstream completion failed: {0}")]
    Upstream(#[from] CompletionError),
    #[error("unreadable request body: {0}")]
    BadBody(#[from] JsonRejection),
}

// Callers get a bare status; the cause only goes to the log.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Upstream(e) => {
                error!(error = %e, "completion call failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            AppError::BadBody(e) => {
                warn!(error = %e, "rejecting unreadable message history");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("turn worker for this session has stopped")]
    Closed,
}
