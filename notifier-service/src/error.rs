use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::{ProviderError, StoreError};

/// Failures of a notifier request.
///
/// Every variant answers `500 { "error": <message> }`; the variants exist for
/// logging and tests, not for the caller. A `Persistence` failure means the
/// push may already have gone out.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Recipient query failed: {0}")]
    RecipientQuery(#[source] StoreError),

    #[error("Notification dispatch failed: {0}")]
    NotificationDispatch(#[source] ProviderError),

    #[error("Failed to record announcement delivery: {0}")]
    Persistence(#[source] StoreError),
}

impl From<JsonRejection> for NotifierError {
    fn from(rejection: JsonRejection) -> Self {
        NotifierError::InvalidRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for NotifierError {
    fn from(errors: validator::ValidationErrors) -> Self {
        NotifierError::InvalidRequest(errors.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for NotifierError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
