//! Error types for design creation and workflow dispatch.

use serde_json::Value;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, DesignError>;

/// Errors that can occur while creating a design.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// The request is missing or has malformed fields.
    #[error("Invalid design request: {0}")]
    InvalidRequest(String),

    /// A command envelope named an action this service does not handle.
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// No access token is stored and none is configured.
    #[error("Missing access token. Visit /auth first.")]
    MissingAccessToken,

    /// The remote design API rejected the request or returned garbage.
    #[error("Failed to create design")]
    DesignCreationFailed {
        status: Option<u16>,
        details: Value,
    },

    /// No workflow trigger credentials are configured.
    #[error("Workflow trigger is not configured")]
    WorkflowUnavailable,

    /// The workflow service rejected the run.
    #[error("Workflow creation failed")]
    WorkflowFailed {
        status: Option<u16>,
        details: Value,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl DesignError {
    /// Remote payload attached to the error, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            DesignError::DesignCreationFailed { details, .. }
            | DesignError::WorkflowFailed { details, .. } => Some(details),
            _ => None,
        }
    }
}

/// Parse a remote body as JSON, falling back to the raw text.
pub(crate) fn body_to_details(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_to_details() {
        assert_eq!(
            body_to_details(r#"{"code":"bad"}"#),
            serde_json::json!({"code": "bad"})
        );
        assert_eq!(body_to_details("oops"), Value::String("oops".to_string()));
    }
}
