//! Error types for the postmark library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Render configuration is missing")]
    RenderConfigMissing,

    #[error("Document is empty")]
    EmptyDocument,

    #[error("HTML is not allowed in this context")]
    HtmlNotAllowed,

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Macro error: {0}")]
    Macro(#[from] MacroError),
}

/// Errors that occur while extracting the metadata block.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Metadata section is missing")]
    Missing,

    #[error("Malformed metadata line: {0:?}")]
    Malformed(String),

    #[error("Unsupported metadata property: {0}")]
    UnsupportedProperty(String),

    #[error("Invalid date {0:?}: {1}")]
    InvalidDate(String, #[source] chrono::ParseError),
}

/// Errors that occur while resolving or invoking macros.
#[derive(Debug, Error)]
pub enum MacroError {
    #[error("Macro {name:?} does not support property {key:?}")]
    UnsupportedProperty { name: String, key: String },

    #[error("Macro {0:?} has no handler")]
    HandlerMissing(String),
}
