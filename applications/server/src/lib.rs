//! Airwave Server Library
//!
//! Single-station live audio broadcast server: one shared timeline streamed
//! to every listener over HTTP.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::transcoding::{TranscodingLoader, TranscodingService};
pub use state::AppState;
