//! API error types and JSON error response formatting.
//!
//! Validation problems are reported as a `bad_request` [`ErrorBody`]. A
//! failed guide request is reported in the chat answer shape with the fixed
//! apology, so clients can show and speak it like any other answer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use wayfind_chat::RequestError;
use wayfind_core::{Role, APOLOGY};

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// Body of a failed `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct FailedAnswerBody {
    pub role: Role,
    pub content: String,
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 500 with the apology answer; upstream detail stays in the logs.
    GuideFailure,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                let body = ErrorBody {
                    error: "bad_request".to_string(),
                    message,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::GuideFailure => {
                let body = FailedAnswerBody {
                    role: Role::Assistant,
                    content: APOLOGY.to_string(),
                    error: "upstream_failure".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Invalid(e) => ApiError::BadRequest(e.to_string()),
            _ => ApiError::GuideFailure,
        }
    }
}
