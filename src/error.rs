//! Error types for the page adapter
//!
//! The polling and dispatch core never fails; these errors only surface while
//! setting things up (loading a page, launching a browser, reading config).

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing an adapter or a page backend
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize a page backend
    #[error("Backend initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load a page
    #[error("Failed to load page: {0}")]
    LoadError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to evaluate a DOM script in a live page
    #[error("Script execution failed: {0}")]
    ScriptError(String),

    /// Action name the dispatcher does not know
    #[error("Unknown player action: {0}")]
    UnknownAction(String),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}
