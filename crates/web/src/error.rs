use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use credregen_common::RegenerateError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Regenerate(#[from] RegenerateError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Regenerate(e) => match e {
                RegenerateError::InvalidName(_) | RegenerateError::Unsupported { .. } => {
                    StatusCode::BAD_REQUEST
                }
                RegenerateError::NotFound(_) | RegenerateError::NoSignedCredentials(_) => {
                    StatusCode::NOT_FOUND
                }
                RegenerateError::Transient(_) | RegenerateError::Cancelled => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                RegenerateError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                RegenerateError::Generation(_) | RegenerateError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credregen_common::{
        CredentialName, InvalidCredentialName, storage::credentials::CredentialRepositoryError,
    };
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let name = CredentialName::parse("/ca").unwrap();
        let cases = [
            (ApiError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
            (
                RegenerateError::InvalidName(InvalidCredentialName::Empty).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                RegenerateError::unsupported_type(&name, credregen_common::CredentialType::Value)
                    .into(),
                StatusCode::BAD_REQUEST,
            ),
            (RegenerateError::NotFound(name.clone()).into(), StatusCode::NOT_FOUND),
            (
                RegenerateError::NoSignedCredentials(name.clone()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                RegenerateError::Transient("down".to_string()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (RegenerateError::Cancelled.into(), StatusCode::SERVICE_UNAVAILABLE),
            (
                RegenerateError::Timeout(Duration::from_secs(1)).into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                RegenerateError::Repository(CredentialRepositoryError::PoisonedLock).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
