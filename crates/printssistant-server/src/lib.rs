//! HTTP endpoints for the printssistant Canva backend.
//!
//! Exposes the OAuth flow (`/auth`, `/callback`, `/refresh`, `/me`) and the
//! design-creation surface (`/agent/command`, `/api/create_design`,
//! `/api/start-workflow`) over axum.
//!
//! # Example
//!
//! ```ignore
//! use printssistant_server::{AppState, Server, ServerConfig};
//!
//! let state = AppState::new(flow, design_proxy, ServerConfig::default());
//! Server::from_state(state).run().await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, Response, header};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info};

/// The backend HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(routes::health_routes())
            .merge(routes::auth_routes())
            .merge(routes::design_routes())
            .layer(DefaultBodyLimit::max(self.state.config.max_body_size));

        if self.state.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
            );
        }

        let log_requests = self.state.config.request_logging;
        router
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(logging::request_span)
                    .on_request(())
                    .on_response(
                        move |response: &Response<Body>, latency: Duration, _span: &Span| {
                            if log_requests {
                                logging::log_response(response, latency);
                            }
                        },
                    )
                    .on_failure(()),
            )
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        self.run_until(addr, std::future::pending()).await
    }

    /// Run until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        info!("Canva backend running on http://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
