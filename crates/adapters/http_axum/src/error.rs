//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use flowmail_domain::error::FlowMailError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`FlowMailError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub enum ApiError {
    Domain(FlowMailError),
    /// The request body was not the JSON the endpoint expects.
    Body(JsonRejection),
}

impl From<FlowMailError> for ApiError {
    fn from(err: FlowMailError) -> Self {
        Self::Domain(err)
    }
}

impl From<flowmail_domain::error::ValidationError> for ApiError {
    fn from(err: flowmail_domain::error::ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Body(rejection) => (rejection.status(), rejection.body_text()),
            Self::Domain(FlowMailError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(FlowMailError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(FlowMailError::Conflict(err)) => (StatusCode::CONFLICT, err.to_string()),
            Self::Domain(err @ (FlowMailError::Storage(_) | FlowMailError::Delivery(_))) => {
                tracing::error!(error = %err, source = ?std::error::Error::source(err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
