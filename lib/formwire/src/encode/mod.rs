//! Body encoders and encode dispatch.
//!
//! Each wire format has a synchronous encoder (blocking file I/O,
//! scalar and file fields only) and an asynchronous encoder (drains
//! streams, one flattened entry in flight at a time). [`FormData::pipe`]
//! and [`FormData::pipe_sync`] select the encoder from the negotiated
//! content type.

mod json;
mod multipart;
mod urlencoded;

pub(crate) use json::static_value_map;
pub(crate) use urlencoded::encoded_pair;

use std::io::Write;

use futures_util::StreamExt;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::field::BodyStream;
use crate::{Error, FormData, Result};

/// Characters left unescaped by `encodeURIComponent`-style URL
/// encoding: alphanumerics and `- _ . ! ~ * ' ( )`.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub(crate) fn url_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, URL_ENCODE_SET).to_string()
}

pub(crate) fn url_encode_bytes(input: &[u8]) -> String {
    percent_encoding::percent_encode(input, URL_ENCODE_SET).to_string()
}

// Multipart framing renderers. Shared between the encoders and the
// content-length computation so the two cannot disagree.

pub(crate) fn part_open(boundary: &str) -> String {
    format!("--{boundary}\r\n")
}

pub(crate) fn part_close(boundary: &str) -> String {
    format!("--{boundary}--\r\n")
}

pub(crate) fn scalar_part_header(key: &str) -> String {
    format!("Content-Disposition: form-data; name=\"{key}\"\r\n\r\n")
}

pub(crate) fn file_part_header(key: &str, filename: &str, content_type: &str) -> String {
    format!(
        "Content-Disposition: form-data; name=\"{key}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
}

impl FormData {
    /// Serialize the body asynchronously into `sink`.
    ///
    /// Traversal is strictly sequential: exactly one flattened entry is
    /// written at a time and the next one does not start until the
    /// previous byte source reached its terminal event, so the byte
    /// order is deterministic and equal to field insertion order. The
    /// returned future is lazy; nothing is written until it is polled.
    ///
    /// Byte-source read errors do not abort the encode: the failing
    /// entry contributes a partial or empty payload, the error is
    /// collected, and traversal continues. A clean encode returns
    /// `Ok(vec![])`. Takes `&mut self` because draining a stream
    /// consumes it; a form whose streams were drained cannot be
    /// re-encoded faithfully (no detection is performed).
    ///
    /// There is no timeout or cancellation primitive here: a stalled
    /// byte source stalls the encode indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `Err` for sink write failures and for an explicit
    /// content type matching none of the known formats.
    pub async fn pipe<W>(&mut self, sink: &mut W) -> Result<Vec<Error>>
    where
        W: AsyncWrite + Unpin,
    {
        let content_type = self.content_type();
        debug!(content_type = %content_type, fields = self.len(), "encoding form body");

        if content_type.contains("form-data") {
            multipart::encode(self, sink).await
        } else if content_type.contains("x-www-form-urlencoded") {
            urlencoded::encode(self, sink).await
        } else if content_type.contains("application/json") {
            json::encode(self, sink).await
        } else {
            Err(Error::unrecognized_content_type(content_type))
        }
    }

    /// Serialize the body synchronously into `sink`.
    ///
    /// Blocks the caller; file contents are read with fixed-size
    /// blocking reads. Byte streams cannot be drained without a
    /// runtime, so a field whose stream would need draining in the
    /// selected format fails with [`Error::StreamRequiresAsync`]
    /// (multipart: stream and file-stream fields; urlencoded and JSON:
    /// raw stream fields, since file-streams only contribute their
    /// filename there). Use [`FormData::pipe`] for forms carrying
    /// streams.
    ///
    /// # Errors
    ///
    /// Returns `Err` for sink write failures, file open/read failures,
    /// undrainable stream fields, and an explicit content type matching
    /// none of the known formats.
    pub fn pipe_sync<W: Write>(&self, sink: &mut W) -> Result<()> {
        let content_type = self.content_type();
        debug!(content_type = %content_type, fields = self.len(), "encoding form body (sync)");

        if content_type.contains("form-data") {
            multipart::encode_sync(self, sink)
        } else if content_type.contains("x-www-form-urlencoded") {
            urlencoded::encode_sync(self, sink)
        } else if content_type.contains("application/json") {
            json::encode_sync(self, sink)
        } else {
            Err(Error::unrecognized_content_type(content_type))
        }
    }
}

/// Drain one byte source into the sink.
///
/// Source errors are recorded in `source_errors` and end the entry (its
/// contribution stays partial); sink errors abort through the outer
/// `Result`.
pub(super) async fn stream_to_sink<W>(
    field: &str,
    source: &mut BodyStream,
    sink: &mut W,
    source_errors: &mut Vec<Error>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(chunk) = source.next().await {
        match chunk {
            Ok(chunk) => sink.write_all(&chunk).await?,
            Err(error) => {
                warn!(field, %error, "byte source failed mid-encode");
                source_errors.push(Error::source_read(field, error));
                break;
            }
        }
    }
    Ok(())
}

/// Stream a file's contents into the sink with 4096-byte reads.
///
/// Open and read failures are recorded in `source_errors`; sink errors
/// abort through the outer `Result`.
pub(super) async fn file_to_sink<W>(
    field: &str,
    path: &std::path::Path,
    sink: &mut W,
    source_errors: &mut Vec<Error>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(error) => {
            warn!(field, %error, "cannot open file field");
            source_errors.push(Error::source_read(field, error));
            return Ok(());
        }
    };

    let mut buf = [0_u8; 4096];
    loop {
        match file.read(&mut buf).await {
            Ok(0) => break,
            Ok(read) => sink.write_all(buf.get(..read).unwrap_or_default()).await?,
            Err(error) => {
                warn!(field, %error, "file read failed mid-encode");
                source_errors.push(Error::source_read(field, error));
                break;
            }
        }
    }
    Ok(())
}

/// Drain one byte source into an in-memory string (lossy UTF-8).
///
/// Source errors are recorded in `source_errors`; the collected prefix
/// is returned either way.
pub(super) async fn stream_to_string(
    field: &str,
    source: &mut BodyStream,
    source_errors: &mut Vec<Error>,
) -> String {
    let mut collected = Vec::new();
    while let Some(chunk) = source.next().await {
        match chunk {
            Ok(chunk) => collected.extend_from_slice(&chunk),
            Err(error) => {
                warn!(field, %error, "byte source failed mid-encode");
                source_errors.push(Error::source_read(field, error));
                break;
            }
        }
    }
    String::from_utf8_lossy(&collected).into_owned()
}
