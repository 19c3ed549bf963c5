use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::PopSentryError;

/// Maps a [`PopSentryError`] onto an HTTP status with a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub PopSentryError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            PopSentryError::MissingInput(_) => StatusCode::BAD_REQUEST,
            PopSentryError::ConflictingInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match &self.0 {
            PopSentryError::MissingInput(m)
            | PopSentryError::ConflictingInput(m)
            | PopSentryError::Config(m)
            | PopSentryError::Advisor(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

impl From<PopSentryError> for ApiError {
    fn from(err: PopSentryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }
        (status, Json(serde_json::json!({ "detail": self.detail() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_client_errors() {
        assert_eq!(
            ApiError(PopSentryError::MissingInput("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(PopSentryError::ConflictingInput("x".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError(PopSentryError::Fetch("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn detail_keeps_plain_message() {
        let err = ApiError(PopSentryError::ConflictingInput("only one".into()));
        assert_eq!(err.detail(), "only one");
        let err = ApiError(PopSentryError::Parse("bad".into()));
        assert_eq!(err.detail(), "Hierarchy parse error: bad");
    }
}
