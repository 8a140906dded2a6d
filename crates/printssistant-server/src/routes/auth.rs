//! OAuth endpoints: start, callback, identity and refresh.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Utc;
use printssistant_oauth::{TokenSet, preview};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Proxy header carrying the host the client originally asked for.
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Query parameters the provider appends to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Response for a successful refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// Host the request was addressed to: `X-Forwarded-Host`, then `Host`.
pub fn request_host(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_HOST)
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// GET /auth
pub async fn auth_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect> {
    let request = state.flow.authorize(&request_host(&headers))?;
    Ok(Redirect::to(&request.url))
}

/// GET /callback and GET /
pub async fn callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        return Err(ServerError::BadRequest(
            format!("Authorization was not granted: {} {}", error, description)
                .trim_end()
                .to_string(),
        ));
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return Ok("Canva backend is up. (No ?code present)".into_response());
    };

    let tokens = state
        .flow
        .handle_callback(&code, query.state.as_deref(), &request_host(&headers))
        .await?;

    Ok(Html(success_page(&tokens)).into_response())
}

fn success_page(tokens: &TokenSet) -> String {
    let refresh = tokens
        .refresh_token
        .as_deref()
        .map(preview)
        .unwrap_or_else(|| "(none)".to_string());

    format!(
        r#"<pre>Tokens acquired!
access_token: {access}
refresh_token: {refresh}
expires_in: {expires}s

You can now call:
- GET /me
- GET /refresh
- POST /api/create_design
- POST /agent/command

Example POST /agent/command body:
{{
  "action": "generate_template",
  "payload": {{ "name": "My Banner", "width": 1200, "height": 600 }}
}}
</pre>"#,
        access = preview(&tokens.access_token),
        refresh = refresh,
        expires = tokens.expires_in_secs(Utc::now()),
    )
}

/// GET /me
pub async fn me_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let user = state.flow.current_user().await?;
    Ok(Json(user))
}

/// GET /refresh
pub async fn refresh_handler(State(state): State<AppState>) -> Result<Json<RefreshResponse>> {
    let tokens = state.flow.refresh().await?;
    Ok(Json(RefreshResponse {
        expires_in: tokens.expires_in_secs(Utc::now()),
        access_token: tokens.access_token,
    }))
}

/// Create OAuth routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(auth_handler))
        .route("/callback", get(callback_handler))
        .route("/", get(callback_handler))
        .route("/me", get(me_handler))
        .route("/refresh", get(refresh_handler))
}
