//! Error types for itemization and font handling.

use thiserror::Error;

/// Result type for textflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced when building runs or loading fonts.
///
/// Line production never fails; running out of text is reported as `None`.
#[derive(Error, Debug)]
pub enum Error {
    /// The character buffer had no characters.
    #[error("cannot itemize an empty character buffer")]
    EmptyInput,

    /// The font cannot render the requested glyph orientation.
    #[error("font `{font}` does not fit the requested orientation: {reason}")]
    FontOrientationMismatch { font: String, reason: &'static str },

    /// No font is registered under the logical name.
    #[error("unknown font: {0}")]
    UnknownFont(String),

    /// Font bytes could not be parsed.
    #[error("invalid font data")]
    InvalidFont,

    /// IO error while reading font files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
