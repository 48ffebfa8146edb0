//! `application/x-www-form-urlencoded` encoders.
//!
//! Flattened entries become `key=value` pairs joined by `&`, both sides
//! URL-encoded. File and file-stream fields contribute their filename
//! as the value; raw stream fields contribute their drained content,
//! URL-encoded chunk by chunk as it passes.

use std::io::Write;

use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

use super::{url_encode, url_encode_bytes};
use crate::flatten::flatten;
use crate::{Error, Field, FormData, Result};

/// Render one URL-encoded `key=value` pair. Shared with the
/// content-length computation.
pub(crate) fn encoded_pair(key: &str, value: &str) -> String {
    format!("{}={}", url_encode(key), url_encode(value))
}

pub(super) async fn encode<W>(form: &mut FormData, sink: &mut W) -> Result<Vec<Error>>
where
    W: AsyncWrite + Unpin,
{
    let mut source_errors = Vec::new();
    let mut first = true;

    for (name, field) in form.entries_mut() {
        match field {
            Field::Scalar(value) => {
                for (key, text) in flatten(name, value) {
                    if !first {
                        sink.write_all(b"&").await?;
                    }
                    first = false;
                    sink.write_all(encoded_pair(&key, &text).as_bytes()).await?;
                }
            }
            Field::File { filename, .. } | Field::FileStream { filename, .. } => {
                if !first {
                    sink.write_all(b"&").await?;
                }
                first = false;
                sink.write_all(encoded_pair(name, filename).as_bytes()).await?;
            }
            Field::Stream(source) => {
                if !first {
                    sink.write_all(b"&").await?;
                }
                first = false;
                sink.write_all(url_encode(name).as_bytes()).await?;
                sink.write_all(b"=").await?;
                while let Some(chunk) = source.next().await {
                    match chunk {
                        Ok(chunk) => {
                            sink.write_all(url_encode_bytes(&chunk).as_bytes()).await?;
                        }
                        Err(error) => {
                            warn!(field = %name, %error, "byte source failed mid-encode");
                            source_errors.push(Error::source_read(name.as_str(), error));
                            break;
                        }
                    }
                }
            }
        }
    }

    Ok(source_errors)
}

pub(super) fn encode_sync<W: Write>(form: &FormData, sink: &mut W) -> Result<()> {
    let mut first = true;

    for (name, field) in form.entries() {
        match field {
            Field::Scalar(value) => {
                for (key, text) in flatten(name, value) {
                    if !first {
                        sink.write_all(b"&")?;
                    }
                    first = false;
                    sink.write_all(encoded_pair(&key, &text).as_bytes())?;
                }
            }
            Field::File { filename, .. } | Field::FileStream { filename, .. } => {
                if !first {
                    sink.write_all(b"&")?;
                }
                first = false;
                sink.write_all(encoded_pair(name, filename).as_bytes())?;
            }
            Field::Stream(_) => return Err(Error::StreamRequiresAsync),
        }
    }

    Ok(())
}
