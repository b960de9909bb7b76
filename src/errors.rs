use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::sync::OnceLock;
use utoipa::ToSchema;

use crate::services::oracle::OracleError;

/// Whether internal error messages are exposed in 500 responses.
/// Set once at startup from `AppConfig`; defaults to hidden.
static EXPOSE_ERROR_DETAILS: OnceLock<bool> = OnceLock::new();

/// Enable or disable internal error details in responses.
/// Called once from `main` after config is loaded; later calls are no-ops.
pub fn set_expose_error_details(expose: bool) {
    let _ = EXPOSE_ERROR_DETAILS.set(expose);
}

fn expose_error_details() -> bool {
    *EXPOSE_ERROR_DETAILS.get().unwrap_or(&false)
}

/// Standard error response body.
///
/// `error` is always present. The remaining fields are populated only by
/// the error classes that carry them: `required` for validation failures,
/// `details`/`code` for oracle failures.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Names of the mandatory request fields (validation failures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<&'static str>>,
    /// Underlying failure detail (oracle failures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Oracle process exit code, when the process exited at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}

impl ErrorResponse {
    fn message(error: String) -> Self {
        Self {
            error,
            required: None,
            details: None,
            code: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing required fields")]
    MissingFields,

    #[error("Prediction failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorResponse::message(msg.clone()))
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::message(msg.clone()))
            }
            AppError::MissingFields => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Missing required fields".to_string(),
                    required: Some(crate::services::prediction::REQUIRED_FIELDS.to_vec()),
                    details: None,
                    code: None,
                },
            ),
            AppError::Oracle(err) => {
                tracing::error!("Oracle invocation failed: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Prediction failed".to_string(),
                        required: None,
                        details: Some(err.to_string()),
                        code: err.exit_code(),
                    },
                )
            }
            AppError::ExternalServiceError(msg) => {
                (StatusCode::BAD_GATEWAY, ErrorResponse::message(msg.clone()))
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                let exposed = if expose_error_details() {
                    msg.clone()
                } else {
                    "Something went wrong".to_string()
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message(exposed),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
