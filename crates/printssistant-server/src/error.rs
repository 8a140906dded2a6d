//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use printssistant_design::DesignError;
use printssistant_oauth::OAuthError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Token lifecycle error.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// Design creation or workflow dispatch error.
    #[error(transparent)]
    Design(#[from] DesignError),

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Remote payload or extra context, null when there is none.
    pub details: Value,
}

impl ServerError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::OAuth(e) => match e {
                OAuthError::ConfigMissing(_) => StatusCode::UNAUTHORIZED,
                OAuthError::MissingVerifier | OAuthError::NoRefreshToken => {
                    StatusCode::BAD_REQUEST
                }
                OAuthError::AuthExchangeFailed { .. }
                | OAuthError::RefreshFailed { .. }
                | OAuthError::IntrospectionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Design(e) => match e {
                DesignError::InvalidRequest(_) | DesignError::UnsupportedAction(_) => {
                    StatusCode::BAD_REQUEST
                }
                DesignError::MissingAccessToken => StatusCode::UNAUTHORIZED,
                DesignError::WorkflowUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                DesignError::WorkflowFailed { status, .. } => status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                DesignError::DesignCreationFailed { .. } | DesignError::Client(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Value {
        match self {
            ServerError::OAuth(e) => e
                .provider_body()
                .map(|body| {
                    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
                })
                .unwrap_or(Value::Null),
            ServerError::Design(e) => e.details().cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let details = self.details();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Server error");
        } else {
            tracing::warn!(status = %status, error = %message, "Client error");
        }

        let body = ErrorResponse {
            error: message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_status_mapping() {
        let cases = [
            (
                ServerError::from(OAuthError::ConfigMissing("CANVA_CLIENT_ID".into())),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ServerError::from(OAuthError::MissingVerifier),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::from(OAuthError::NoRefreshToken),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServerError::from(OAuthError::RefreshFailed {
                    status: Some(400),
                    body: "invalid_grant".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }

    #[test]
    fn test_workflow_failure_keeps_remote_status() {
        let err = ServerError::from(DesignError::WorkflowFailed {
            status: Some(404),
            details: serde_json::json!({"error": "no such workflow"}),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ServerError::from(DesignError::WorkflowFailed {
            status: None,
            details: Value::Null,
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_details_parse_provider_json() {
        let err = ServerError::from(OAuthError::AuthExchangeFailed {
            status: Some(400),
            body: r#"{"error":"invalid_grant"}"#.into(),
        });
        assert_eq!(err.details(), serde_json::json!({"error": "invalid_grant"}));

        let err = ServerError::from(OAuthError::AuthExchangeFailed {
            status: None,
            body: "connection refused".into(),
        });
        assert_eq!(err.details(), Value::String("connection refused".into()));

        assert_eq!(ServerError::BadRequest("x".into()).details(), Value::Null);
    }

    #[test]
    fn test_missing_access_token_is_unauthorized() {
        let err = ServerError::from(DesignError::MissingAccessToken);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
