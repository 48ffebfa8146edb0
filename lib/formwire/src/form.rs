//! The form field store.
//!
//! [`FormData`] holds named fields in insertion order, negotiates the
//! body content type, and serializes on demand through the encoders.
//!
//! # Example
//!
//! ```
//! use formwire::FormData;
//!
//! let mut form = FormData::new();
//! form.set("name", "Bob");
//! form.set("age", 30);
//!
//! assert_eq!(
//!     form.content_type(),
//!     "application/x-www-form-urlencoded"
//! );
//! assert_eq!(form.to_bytes().unwrap().as_ref(), b"name=Bob&age=30");
//! ```

use std::path::PathBuf;

use bytes::{BufMut, Bytes, BytesMut};

use crate::field::{BodyStream, token};
use crate::{Field, Result};

/// An ordered set of named form fields with a multipart boundary.
///
/// Fields are kept in insertion order, which is the order they appear
/// in the multipart and urlencoded wire output. Setting an existing
/// name replaces the field in place; deleting and re-setting moves it
/// to the end.
///
/// The boundary token is generated once at construction and can be
/// fixed for deterministic output with [`FormData::with_boundary`] or
/// overridden by a `boundary=` parameter in an explicitly set content
/// type.
#[derive(Debug)]
pub struct FormData {
    fields: Vec<(String, Field)>,
    boundary: String,
    /// Explicit content type override; `None` means auto-detect.
    content_type: Option<String>,
}

impl Default for FormData {
    fn default() -> Self {
        Self::new()
    }
}

impl FormData {
    /// Create an empty form with a generated boundary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            boundary: format!("----FormWire{}", token()),
            content_type: None,
        }
    }

    /// Create an empty form with a fixed boundary.
    ///
    /// The boundary should be a unique string that does not appear in
    /// any field value (not verified).
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            fields: Vec::new(),
            boundary: boundary.into(),
            content_type: None,
        }
    }

    /// Get the multipart boundary token.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Get a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field)
    }

    /// Set a scalar field.
    ///
    /// Accepts anything convertible to a JSON value: strings, numbers,
    /// booleans, arrays, and nested objects. Nested containers are
    /// flattened into bracketed wire keys at encode time.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.set_entry(name, Field::scalar(value));
    }

    /// Set a pre-built field, replacing any previous variant under the
    /// same name.
    pub fn set_entry(&mut self, name: impl Into<String>, field: Field) {
        let name = name.into();
        let field = field.normalized();
        if let Some(slot) = self
            .fields
            .iter_mut()
            .find(|(field_name, _)| *field_name == name)
        {
            slot.1 = field;
        } else {
            self.fields.push((name, field));
        }
    }

    /// Set a raw byte-stream field.
    pub fn set_stream(&mut self, name: impl Into<String>, source: BodyStream) {
        self.set_entry(name, Field::stream(source));
    }

    /// Set a file field for the given path.
    ///
    /// The wire filename is the path's base name and the content type
    /// defaults to `binary/octet-stream`; use
    /// [`Field::file`] with [`Field::with_filename`] /
    /// [`Field::with_content_type`] and [`FormData::set_entry`] to
    /// customize either.
    pub fn set_file(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.set_entry(name, Field::file(path));
    }

    /// Set a file-stream field: a byte source presented as a file
    /// upload, with a generated fallback filename.
    pub fn set_file_stream(&mut self, name: impl Into<String>, source: BodyStream) {
        self.set_entry(name, Field::file_stream(source));
    }

    /// Remove a field. Re-setting it later appends it at the end.
    pub fn delete(&mut self, name: &str) {
        self.fields.retain(|(field_name, _)| field_name != name);
    }

    /// Remove all fields.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the form holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Set an explicit content type, disabling auto-detection.
    ///
    /// A `boundary=` parameter (case-insensitive) in the value replaces
    /// the stored boundary token.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        let content_type = content_type.into();
        if let Some(boundary) = extract_boundary(&content_type) {
            self.boundary = boundary;
        }
        self.content_type = Some(content_type);
    }

    /// The explicit content type override, if any.
    pub(crate) fn content_type_override(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Encode the body synchronously into an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StreamRequiresAsync`] if a field's byte
    /// source would need draining in the selected format, and
    /// [`crate::Error::UnrecognizedContentType`] if an explicit content
    /// type matches no known format.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut writer = BytesMut::new().writer();
        self.pipe_sync(&mut writer)?;
        Ok(writer.into_inner().freeze())
    }

    pub(crate) fn entries(&self) -> &[(String, Field)] {
        &self.fields
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [(String, Field)] {
        &mut self.fields
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for FormData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut form = Self::new();
        form.extend(iter);
        form
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> Extend<(K, V)> for FormData {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.set(name, value);
        }
    }
}

/// Extract the `boundary=` parameter from a content type string,
/// case-insensitively, stopping at the next `;`.
///
/// Scans the original bytes rather than a lowercased copy, so
/// case-changing multi-byte characters earlier in the string cannot
/// shift the match offset.
fn extract_boundary(content_type: &str) -> Option<String> {
    const NEEDLE: &[u8] = b"boundary=";

    let start = content_type
        .as_bytes()
        .windows(NEEDLE.len())
        .position(|window| window.eq_ignore_ascii_case(NEEDLE))?
        + NEEDLE.len();
    let rest = content_type.get(start..)?;
    let end = rest.find(';').unwrap_or(rest.len());
    let boundary = rest.get(..end)?.trim();
    if boundary.is_empty() {
        None
    } else {
        Some(boundary.to_string())
    }
}
