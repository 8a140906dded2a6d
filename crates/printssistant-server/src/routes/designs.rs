//! Design creation endpoints.

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use printssistant_design::{AgentCommand, DesignCreated, DesignSpec};
use serde::de::DeserializeOwned;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Decode a JSON body, treating an empty body as `{}`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(raw)
        .map_err(|e| ServerError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// POST /api/create_design
pub async fn create_design_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DesignCreated>> {
    let spec: DesignSpec = parse_body(&body)?;
    let created = state.designs.create_design(&spec).await?;
    Ok(Json(created))
}

/// POST /agent/command
pub async fn agent_command_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DesignCreated>> {
    let command: AgentCommand = parse_body(&body)?;
    let spec = command.into_design_spec()?;
    let created = state.designs.create_design(&spec).await?;
    Ok(Json(created))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/create_design", post(create_design_handler))
        .route("/agent/command", post(agent_command_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use printssistant_oauth::InMemoryTokenStore;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        routes().with_state(test_support::state(
            "http://127.0.0.1:9",
            InMemoryTokenStore::new(),
        ))
    }

    async fn post_json(uri: &str, body: &str) -> Response {
        app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_parse_body_empty_is_empty_object() {
        let spec: DesignSpec = parse_body(&Bytes::from_static(b"  ")).unwrap();
        assert!(spec.name.is_none());
        assert!(parse_body::<DesignSpec>(&Bytes::from_static(b"{oops")).is_err());
    }

    #[tokio::test]
    async fn test_missing_fields_is_bad_request() {
        let response = post_json("/api/create_design", r#"{"name":"Banner"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid design request"));
    }

    #[tokio::test]
    async fn test_empty_body_is_bad_request() {
        let response = post_json("/api/create_design", "").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = post_json("/api/create_design", "{not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_valid_request_without_token_is_unauthorized() {
        let response = post_json(
            "/api/create_design",
            r#"{"name":"Banner","width":1200,"height":600}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_agent_action() {
        let response = post_json("/agent/command", r#"{"action":"delete_everything"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("delete_everything"));
    }
}
