//! Form field model.
//!
//! A [`Field`] is a named unit of form data holding exactly one variant:
//! a plain scalar value, an unconsumed byte stream, a file on disk, or a
//! byte stream presented as a file upload. Fields are stored in a
//! [`crate::FormData`] and read by the encoders at serialization time.

use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;

/// A one-shot byte source: chunks of bytes arriving over time.
///
/// Emits a sequence of data chunks followed by exactly one terminal
/// event (end of stream, or an error). Readable exactly once: a drained
/// stream cannot be replayed, and re-encoding a form after one of its
/// streams was consumed is undefined (no detection is performed).
pub type BodyStream = Pin<Box<dyn Stream<Item = crate::Result<Bytes>> + Send>>;

/// Default content type for file fields.
pub(crate) const DEFAULT_FILE_CONTENT_TYPE: &str = "binary/octet-stream";

/// A single form field value.
///
/// Every field holds exactly one variant at a time; re-setting a field
/// under the same name replaces the variant entirely.
pub enum Field {
    /// Plain value: string, number, boolean, null, or a nested
    /// array/object that is flattened into `name[i]` / `name[key]` wire
    /// entries at encode time.
    Scalar(serde_json::Value),
    /// An unconsumed byte stream of unknown length. Forces multipart
    /// content type and makes the content length uncomputable.
    Stream(BodyStream),
    /// A file on disk, streamed from `path` at encode time. Its length
    /// is knowable via a file-size lookup.
    File {
        /// Path the file contents are read from.
        path: PathBuf,
        /// Filename reported on the wire; always non-empty.
        filename: String,
        /// Content type of the multipart part.
        content_type: String,
    },
    /// A byte stream presented as a file upload; length unknown.
    FileStream {
        /// The byte source drained at encode time.
        source: BodyStream,
        /// Filename reported on the wire; always non-empty.
        filename: String,
        /// Content type of the multipart part.
        content_type: String,
    },
}

impl Field {
    /// Create a scalar field from any JSON-representable value.
    #[must_use]
    pub fn scalar(value: impl Into<serde_json::Value>) -> Self {
        Self::Scalar(value.into())
    }

    /// Create a stream field from a byte source.
    #[must_use]
    pub fn stream(source: BodyStream) -> Self {
        Self::Stream(source)
    }

    /// Create a file field for the given path.
    ///
    /// The filename defaults to the path's base name, or a generated
    /// token when the path has none; the content type defaults to
    /// `binary/octet-stream`. Both can be overridden with
    /// [`Field::with_filename`] and [`Field::with_content_type`].
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = filename_from_path(&path);
        Self::File {
            path,
            filename,
            content_type: DEFAULT_FILE_CONTENT_TYPE.to_string(),
        }
    }

    /// Create a file-stream field from a byte source.
    ///
    /// Streams carry no inherent name, so the filename defaults to a
    /// generated timestamp+random token unless overridden.
    #[must_use]
    pub fn file_stream(source: BodyStream) -> Self {
        Self::FileStream {
            source,
            filename: token(),
            content_type: DEFAULT_FILE_CONTENT_TYPE.to_string(),
        }
    }

    /// Set the wire filename. No effect on scalar and stream fields.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        match &mut self {
            Self::File { filename: f, .. } | Self::FileStream { filename: f, .. } => {
                *f = filename.into();
            }
            Self::Scalar(_) | Self::Stream(_) => {}
        }
        self
    }

    /// Set the part content type. No effect on scalar and stream fields.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        match &mut self {
            Self::File {
                content_type: ct, ..
            }
            | Self::FileStream {
                content_type: ct, ..
            } => {
                *ct = content_type.into();
            }
            Self::Scalar(_) | Self::Stream(_) => {}
        }
        self
    }

    /// Get the wire filename, if this is a file or file-stream field.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::File { filename, .. } | Self::FileStream { filename, .. } => Some(filename),
            Self::Scalar(_) | Self::Stream(_) => None,
        }
    }

    /// Get the part content type, if this is a file or file-stream field.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::File { content_type, .. } | Self::FileStream { content_type, .. } => {
                Some(content_type)
            }
            Self::Scalar(_) | Self::Stream(_) => None,
        }
    }

    /// Get the scalar value, if this is a scalar field.
    #[must_use]
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if this field is backed by a byte stream
    /// (stream or file-stream variants).
    #[must_use]
    pub const fn is_stream_backed(&self) -> bool {
        matches!(self, Self::Stream(_) | Self::FileStream { .. })
    }

    /// Restore the non-empty filename invariant after builder-style
    /// mutation. Called on insertion into the store.
    pub(crate) fn normalized(mut self) -> Self {
        match &mut self {
            Self::File { filename, path, .. } => {
                if filename.is_empty() {
                    *filename = filename_from_path(path);
                }
            }
            Self::FileStream { filename, .. } => {
                if filename.is_empty() {
                    *filename = token();
                }
            }
            Self::Scalar(_) | Self::Stream(_) => {}
        }
        self
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::Stream(_) => f.debug_struct("Stream").finish_non_exhaustive(),
            Self::File {
                path,
                filename,
                content_type,
            } => f
                .debug_struct("File")
                .field("path", path)
                .field("filename", filename)
                .field("content_type", content_type)
                .finish(),
            Self::FileStream {
                filename,
                content_type,
                ..
            } => f
                .debug_struct("FileStream")
                .field("filename", filename)
                .field("content_type", content_type)
                .finish_non_exhaustive(),
        }
    }
}

/// Derive a wire filename from a path's base name, falling back to a
/// generated token for paths without one (e.g. `/` or `..`).
fn filename_from_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(token)
}

/// Generate a process-unique token: base-36 millisecond timestamp plus
/// a base-36 random suffix. Used for boundary generation and fallback
/// filenames; unlikely (but not guaranteed) to collide with field data.
pub(crate) fn token() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    use std::time::{SystemTime, UNIX_EPOCH};

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let random = RandomState::new().build_hasher().finish();

    format!("{}{}", base36(millis), base36(u128::from(random)))
}

/// Render a number in lowercase base-36.
fn base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        let digit = u32::try_from(value % 36).unwrap_or(0);
        digits.push(char::from_digit(digit, 36).unwrap_or('0'));
        value /= 36;
    }
    digits.iter().rev().collect()
}
