//! Mapping from pipeline errors to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use namecheck_runtime::ClassifyError;

/// An error the client sees as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Body missing, not JSON, or not an object.
    InvalidPayload,

    /// The pipeline could not produce a verdict.
    Classify(ClassifyError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload => StatusCode::BAD_REQUEST,
            ApiError::Classify(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Classify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client.
    ///
    /// Server-side failures use a fixed message per kind; provider
    /// details stay in the log.
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidPayload => "Invalid JSON payload".to_string(),
            ApiError::Classify(e) => match e {
                ClassifyError::EmptyName => "No name provided".to_string(),
                ClassifyError::InvalidModel { allowed, .. } => {
                    format!("Invalid model. Choose from {:?}", allowed)
                }
                ClassifyError::Remote(_) => "Remote model call failed".to_string(),
                ClassifyError::MalformedResponse { .. } => {
                    "Invalid JSON response format from model".to_string()
                }
                ClassifyError::InvalidPrediction { .. } => {
                    "Invalid prediction value from model".to_string()
                }
            },
        }
    }
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        ApiError::Classify(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namecheck_runtime::ProviderError;
    use std::time::Duration;

    #[test]
    fn test_client_errors_are_400() {
        assert_eq!(ApiError::InvalidPayload.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ClassifyError::EmptyName).status(),
            StatusCode::BAD_REQUEST
        );

        let err = ApiError::from(ClassifyError::InvalidModel {
            model: "x".to_string(),
            allowed: vec!["gpt-4.1".to_string(), "gpt-4o-mini".to_string()],
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message(),
            r#"Invalid model. Choose from ["gpt-4.1", "gpt-4o-mini"]"#
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = ApiError::from(ClassifyError::Remote(ProviderError::ApiError {
            status: 502,
            message: "upstream detail".to_string(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Remote model call failed");

        let err = ApiError::from(ClassifyError::Remote(ProviderError::Timeout(
            Duration::from_secs(1),
        )));
        assert_eq!(err.message(), "Remote model call failed");

        let err = ApiError::from(ClassifyError::MalformedResponse {
            detail: "not valid JSON".to_string(),
            raw: "hello".to_string(),
        });
        assert_eq!(err.message(), "Invalid JSON response format from model");
    }
}
