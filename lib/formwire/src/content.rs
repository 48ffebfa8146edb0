//! Content type negotiation and content length computation.
//!
//! The content type is either an explicit override or auto-detected
//! from the field variants: any stream/file field forces multipart,
//! otherwise the body is urlencoded. The content length replays the
//! exact structural accounting the encoders perform, using the same
//! rendering helpers, so the computed value always matches the
//! serialized byte count.

use crate::encode::{
    encoded_pair, file_part_header, part_close, part_open, scalar_part_header, static_value_map,
};
use crate::flatten::flatten;
use crate::{Error, Field, FormData, Result};

impl FormData {
    /// The effective content type of the body.
    ///
    /// Returns the explicit override if one was set with
    /// [`FormData::set_content_type`]. Otherwise any stream, file, or
    /// file-stream field forces `multipart/form-data` with this
    /// instance's boundary, and a scalar-only form is
    /// `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn content_type(&self) -> String {
        if let Some(explicit) = self.content_type_override() {
            return explicit.to_string();
        }
        let multipart = self
            .iter()
            .any(|(_, field)| !matches!(field, Field::Scalar(_)));
        if multipart {
            format!("multipart/form-data; boundary={}", self.boundary())
        } else {
            "application/x-www-form-urlencoded".to_string()
        }
    }

    /// The exact byte length of the serialized body, or `None` when it
    /// cannot be known in advance.
    ///
    /// The length is uncomputable when any field is a raw stream, or,
    /// in multipart mode, a file-stream (unbounded sources defeat the
    /// count; plain file fields are fine because their size is
    /// statable). An explicit content type matching no known format
    /// also yields `None`, and [`FormData::headers`] falls back to
    /// chunked transfer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stat`] if a file field's size lookup fails.
    pub fn content_length(&self) -> Result<Option<u64>> {
        if self
            .iter()
            .any(|(_, field)| matches!(field, Field::Stream(_)))
        {
            return Ok(None);
        }

        let content_type = self.content_type();
        if content_type.contains("form-data") {
            self.multipart_length()
        } else if content_type.contains("x-www-form-urlencoded") {
            Ok(Some(self.urlencoded_length()))
        } else if content_type.contains("application/json") {
            let body = serde_json::to_vec(&static_value_map(self))?;
            Ok(Some(body.len() as u64))
        } else {
            Ok(None)
        }
    }

    fn multipart_length(&self) -> Result<Option<u64>> {
        let boundary = self.boundary();
        let open = part_open(boundary).len() as u64;
        let mut total = 0_u64;

        for (name, field) in self.iter() {
            match field {
                Field::Scalar(value) => {
                    for (key, text) in flatten(name, value) {
                        total +=
                            open + scalar_part_header(&key).len() as u64 + text.len() as u64 + 2;
                    }
                }
                Field::File {
                    path,
                    filename,
                    content_type,
                } => {
                    let size = std::fs::metadata(path)
                        .map_err(|error| Error::stat(path.display().to_string(), error))?
                        .len();
                    total += open
                        + file_part_header(name, filename, content_type).len() as u64
                        + size
                        + 2;
                }
                Field::FileStream { .. } | Field::Stream(_) => return Ok(None),
            }
        }

        total += part_close(boundary).len() as u64;
        Ok(Some(total))
    }

    fn urlencoded_length(&self) -> u64 {
        let mut total = 0_u64;
        let mut first = true;

        for (name, field) in self.iter() {
            match field {
                Field::Scalar(value) => {
                    for (key, text) in flatten(name, value) {
                        if !first {
                            total += 1;
                        }
                        first = false;
                        total += encoded_pair(&key, &text).len() as u64;
                    }
                }
                Field::File { filename, .. } | Field::FileStream { filename, .. } => {
                    if !first {
                        total += 1;
                    }
                    first = false;
                    total += encoded_pair(name, filename).len() as u64;
                }
                // Ruled out by the countable check in content_length.
                Field::Stream(_) => {}
            }
        }

        total
    }
}
