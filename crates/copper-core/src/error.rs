//! Unified error type for the copper crates
//!
//! Library crates return [`CopperResult`]; the binary and the file-loading
//! layer wrap these in `anyhow` with file context.
//!
//! # Example
//!
//! ```ignore
//! use copper_core::{CopperError, CopperResult};
//!
//! fn figure_for(network: &Network, mode: &str) -> CopperResult<Figure> {
//!     let mode: DisplayMode = mode.parse()?;
//!     colored_network_figure_for_mode(network, mode, None)
//! }
//! ```

use thiserror::Error;

/// Error type shared by every copper operation.
#[derive(Error, Debug)]
pub enum CopperError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing errors (timestamps, numbers, CSV cells)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data shape errors (ragged tables, mismatched lengths)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network structure errors (duplicate buses, dangling branch ends)
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A display mode name that no figure builder knows about
    #[error("Unknown display mode: \"{0}\"")]
    UnknownMode(String),

    /// A snapshot, table or element that a computation needs is absent
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using CopperError.
pub type CopperResult<T> = Result<T, CopperError>;

impl From<anyhow::Error> for CopperError {
    fn from(err: anyhow::Error) -> Self {
        CopperError::Other(err.to_string())
    }
}

impl From<String> for CopperError {
    fn from(s: String) -> Self {
        CopperError::Other(s)
    }
}

impl From<&str> for CopperError {
    fn from(s: &str) -> Self {
        CopperError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for CopperError {
    fn from(err: serde_json::Error) -> Self {
        CopperError::Parse(err.to_string())
    }
}

impl From<chrono::ParseError> for CopperError {
    fn from(err: chrono::ParseError) -> Self {
        CopperError::Parse(err.to_string())
    }
}
