//! Unified error handling for the API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use colony_core::DispatchError;

/// API error response body
#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

/// Application error types
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        (
            status,
            Json(ApiError {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::AgentNotFound(_) | DispatchError::WorkflowNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            DispatchError::InvalidTask(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:?}", err);
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DispatchError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_dispatch_errors_map_to_status_codes() {
        assert_eq!(
            status_of(DispatchError::AgentNotFound("ghost".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DispatchError::WorkflowNotFound("nope".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DispatchError::InvalidTask("empty request".to_string())),
            StatusCode::BAD_REQUEST
        );
    }
}
