//! Conversion of request and ledger failures into JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::AppError;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The errors a handler may return.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is missing, is not JSON, or does not have the expected shape.
    #[error("invalid request")]
    InvalidRequest,

    /// The user ID in the path is not an integer.
    #[error("invalid userID")]
    InvalidUserId,

    /// The ledger rejected or failed the operation.
    #[error(transparent)]
    Ledger(#[from] AppError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("rejected request body: {}", rejection.body_text());
        ApiError::InvalidRequest
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("rejected path: {}", rejection.body_text());
        ApiError::InvalidUserId
    }
}

impl ApiError {
    /// Business-rule and validation failures are the client's fault; storage
    /// failures are ours and their details stay in the log.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::InvalidRequest | ApiError::InvalidUserId => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Ledger(error) if error.is_client_error() => {
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            ApiError::Ledger(error) => {
                tracing::error!("an unexpected ledger error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}
