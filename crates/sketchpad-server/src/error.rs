//! HTTP error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sketchpad_core::StorageError;

/// A store failure rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub StorageError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            StorageError::NotFound(_) => StatusCode::NOT_FOUND,
            StorageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StorageError::Serialization(_) | StorageError::Io(_) | StorageError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self(err)
    }
}

/// A request body that is not a valid sketch payload.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(StorageError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Store failure: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
