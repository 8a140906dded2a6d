//! Environment configuration for the printssistant backend.
//!
//! Everything is read from process environment variables (a `.env` file
//! may seed them). Unset and empty variables fall back to defaults; values
//! that are present but malformed are errors.

pub mod error;
pub mod types;

pub use error::{ConfigError, Result};
pub use types::{AppConfig, env_vars};
