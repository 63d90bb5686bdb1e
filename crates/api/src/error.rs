// ABOUTME: ApiError enumerates the failures the logo endpoint can surface to a caller.
// ABOUTME: Each variant maps to an HTTP status and a public message; internal detail stays in logs.

use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::AuthError;

/// Generic message returned for 500 responses.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message safe to show a caller.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized(_) => "unauthorized".to_string(),
            ApiError::BadRequest(reason) => reason.clone(),
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}
