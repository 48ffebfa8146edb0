//! Error types for formwire.

use derive_more::{Display, Error, From};

/// Main error type for formwire operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// A file or stream byte source failed mid-read.
    ///
    /// During asynchronous encoding this is reported through the
    /// `Vec<Error>` returned by `pipe` and does not abort the encode;
    /// the failing entry contributes a partial or empty payload.
    #[display("source read error for field '{field}': {message}")]
    #[from(skip)]
    SourceRead {
        /// Name of the field whose byte source failed.
        field: String,
        /// Underlying read error message.
        message: String,
    },

    /// An explicitly set content type matches none of the known formats
    /// (multipart, urlencoded, JSON), so no encoder can be selected.
    #[display("unrecognized content type: {_0}")]
    #[from(skip)]
    UnrecognizedContentType(#[error(not(source))] String),

    /// File size lookup failed while computing the content length.
    #[display("cannot stat '{path}': {message}")]
    #[from(skip)]
    Stat {
        /// Path of the file that could not be stat'd.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// A stream-backed field reached a synchronous encode path.
    ///
    /// Stream and file-stream fields can only be drained by the
    /// asynchronous `pipe`.
    #[display("stream fields require asynchronous encoding")]
    #[from(skip)]
    StreamRequiresAsync,

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// I/O error writing to the sink.
    #[display("I/O error: {_0}")]
    #[from]
    Io(std::io::Error),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a source read error for the given field.
    #[must_use]
    pub fn source_read(field: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::SourceRead {
            field: field.into(),
            message: error.to_string(),
        }
    }

    /// Create a stat error for the given path.
    #[must_use]
    pub fn stat(path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Stat {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Create an unrecognized content type error.
    #[must_use]
    pub fn unrecognized_content_type(content_type: impl Into<String>) -> Self {
        Self::UnrecognizedContentType(content_type.into())
    }

    /// Returns `true` if this is a source read error.
    #[must_use]
    pub const fn is_source_read(&self) -> bool {
        matches!(self, Self::SourceRead { .. })
    }

    /// Returns the field name if this is a source read error.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::SourceRead { field, .. } => Some(field),
            _ => None,
        }
    }
}
