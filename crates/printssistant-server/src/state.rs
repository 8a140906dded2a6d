//! Application state shared across handlers.

use std::sync::Arc;

use printssistant_design::{DesignProxy, WorkflowTrigger};
use printssistant_oauth::OAuthFlow;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// OAuth flow controller (owns the current tokens).
    pub flow: Arc<OAuthFlow>,

    /// Authenticated design creation.
    pub designs: Arc<DesignProxy>,

    /// Workflow dispatch, None when no trigger token is configured.
    pub workflows: Option<Arc<WorkflowTrigger>>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(flow: Arc<OAuthFlow>, designs: DesignProxy, config: ServerConfig) -> Self {
        Self {
            flow,
            designs: Arc::new(designs),
            workflows: None,
            config: Arc::new(config),
        }
    }

    /// Attach a workflow trigger. Unconfigured triggers are ignored.
    pub fn with_workflows(mut self, trigger: WorkflowTrigger) -> Self {
        if trigger.is_configured() {
            self.workflows = Some(Arc::new(trigger));
        } else {
            tracing::debug!("Workflow trigger has no auth token, leaving it disabled");
        }
        self
    }
}
