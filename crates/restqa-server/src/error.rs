use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use restqa_error::{ErrorKind, RestqaError};
use serde_json::json;
use tracing::error;

/// Handler error. Always rendered as `{"message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub RestqaError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::BadRequest => StatusCode::NOT_ACCEPTABLE,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            // Rejected init answers surface as plain failures.
            ErrorKind::Validation
            | ErrorKind::Malformed
            | ErrorKind::External
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RestqaError> for ApiError {
    fn from(err: RestqaError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "message": self.0.to_string() }))).into_response()
    }
}
