//! Design-creation proxy for the Canva design API.
//!
//! Normalises loosely-typed "create a design" requests (physical units,
//! free-text metadata), authenticates them with the token held by
//! [`printssistant_oauth::OAuthFlow`], and forwards them to the remote API.
//! Requests may alternatively be dispatched to a durable workflow.

pub mod client;
pub mod error;
pub mod proxy;
pub mod request;
pub mod units;
pub mod workflow;

pub use client::{DEFAULT_VIEW_BASE, DesignClient, DesignCreated};
pub use error::{DesignError, Result};
pub use proxy::DesignProxy;
pub use request::{AgentCommand, DesignSpec, NormalizedDesign, Palette};
pub use units::{PIXELS_PER_INCH, Unit};
pub use workflow::{WorkflowConfig, WorkflowStarted, WorkflowTrigger};
