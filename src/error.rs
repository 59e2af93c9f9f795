//! Error types for papertex library.

use std::io;
use thiserror::Error;

/// Result type alias for papertex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while acquiring or rendering a manuscript.
///
/// Structural absence (no title, no sections, no tables) is never an error;
/// those cases degrade to "not detected" values in the document model.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is a recognized format that must be converted by an external adapter.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// The input is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// An input adapter failed to produce a source bundle.
    #[error("Input acquisition failed: {0}")]
    InputAcquisition(String),

    /// A math markup fragment could not be interpreted at all.
    #[error("Math markup error: {0}")]
    MathMarkup(String),

    /// The requested template profile does not exist.
    #[error("Unknown template: {0} (expected one of: ieee, acm, springer)")]
    UnknownTemplate(String),

    /// Invalid configuration file or value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during rendering (LaTeX, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Render(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}
