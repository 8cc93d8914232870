use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::normalize::ValidationError;

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A crate error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let err = &self.0;
        if err.is_validation_error() {
            StatusCode::BAD_REQUEST
        } else if err.is_unauthenticated() {
            StatusCode::UNAUTHORIZED
        } else if err.is_forbidden() {
            StatusCode::FORBIDDEN
        } else if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Maps an undecodable JSON body to a 400.
pub(crate) fn invalid_payload(rejection: JsonRejection) -> ApiError {
    ValidationError::InvalidPayload {
        reason: rejection.body_text(),
    }
    .into()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(%status, error = %self.0, "request rejected");
            self.0.to_string()
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
