//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use airsched_domain::error::AirschedError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`AirschedError`] to an HTTP response with appropriate status code.
pub struct ApiError(AirschedError);

impl From<AirschedError> for ApiError {
    fn from(err: AirschedError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AirschedError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AirschedError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            AirschedError::Connectivity(err) => {
                tracing::warn!(error = %err, "device unreachable");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            AirschedError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
