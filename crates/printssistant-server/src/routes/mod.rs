//! API routes.

pub mod auth;
pub mod designs;
pub mod health;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

pub use auth::{auth_routes, request_host};
pub use health::health_routes;

/// Design creation and workflow dispatch routes.
pub fn design_routes() -> Router<AppState> {
    designs::routes().merge(workflows::routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use printssistant_design::{DesignClient, DesignProxy};
    use printssistant_oauth::{
        DeploymentTier, InMemoryTokenStore, OAuthConfig, OAuthFlow, ProviderClient,
        RedirectResolver, SharedTokenStore,
    };

    use crate::config::ServerConfig;
    use crate::state::AppState;

    pub const LOCAL_REDIRECT: &str = "http://127.0.0.1:4000/callback";
    pub const PROD_REDIRECT: &str = "https://printssistant-canva-backend.vercel.app/callback";

    /// State wired against `api_base`, with an in-memory token store.
    pub fn state(api_base: &str, store: InMemoryTokenStore) -> AppState {
        let config = OAuthConfig::new(Some("client-123".into()), Some("s3cret".into()))
            .with_authorize_url(format!("{api_base}/oauth/authorize"));
        let resolver = RedirectResolver::new(DeploymentTier::Auto, LOCAL_REDIRECT, PROD_REDIRECT);
        let provider = ProviderClient::new(api_base, Duration::from_secs(2)).unwrap();
        let store: SharedTokenStore = Arc::new(store);
        let flow = Arc::new(OAuthFlow::new(config, resolver, provider, store));

        let client = DesignClient::new(api_base, Duration::from_secs(2)).unwrap();
        let designs = DesignProxy::new(flow.clone(), client);

        AppState::new(flow, designs, ServerConfig::default())
    }
}
