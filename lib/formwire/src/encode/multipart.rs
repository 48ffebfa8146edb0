//! `multipart/form-data` encoders.
//!
//! Wire grammar per flattened entry: `--<boundary>\r\n`, a
//! `Content-Disposition` header (with `filename` and `Content-Type`
//! lines for file parts), an empty line, the payload, `\r\n`. The body
//! is terminated by `--<boundary>--\r\n`.

use std::io::{Read, Write};
use std::path::Path;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use super::{
    file_part_header, file_to_sink, part_close, part_open, scalar_part_header, stream_to_sink,
};
use crate::flatten::flatten;
use crate::{Error, Field, FormData, Result};

const CRLF: &[u8] = b"\r\n";

pub(super) async fn encode<W>(form: &mut FormData, sink: &mut W) -> Result<Vec<Error>>
where
    W: AsyncWrite + Unpin,
{
    let boundary = form.boundary().to_string();
    let mut source_errors = Vec::new();

    for (name, field) in form.entries_mut() {
        match field {
            Field::Scalar(value) => {
                for (key, text) in flatten(name, value) {
                    trace!(key = %key, "writing scalar part");
                    sink.write_all(part_open(&boundary).as_bytes()).await?;
                    sink.write_all(scalar_part_header(&key).as_bytes()).await?;
                    sink.write_all(text.as_bytes()).await?;
                    sink.write_all(CRLF).await?;
                }
            }
            Field::File {
                path,
                filename,
                content_type,
            } => {
                trace!(field = %name, "writing file part");
                sink.write_all(part_open(&boundary).as_bytes()).await?;
                sink.write_all(file_part_header(name, filename, content_type).as_bytes())
                    .await?;
                file_to_sink(name, path, sink, &mut source_errors).await?;
                sink.write_all(CRLF).await?;
            }
            Field::FileStream {
                source,
                filename,
                content_type,
            } => {
                trace!(field = %name, "writing file-stream part");
                sink.write_all(part_open(&boundary).as_bytes()).await?;
                sink.write_all(file_part_header(name, filename, content_type).as_bytes())
                    .await?;
                stream_to_sink(name, source, sink, &mut source_errors).await?;
                sink.write_all(CRLF).await?;
            }
            Field::Stream(source) => {
                trace!(field = %name, "writing stream part");
                sink.write_all(part_open(&boundary).as_bytes()).await?;
                sink.write_all(scalar_part_header(name).as_bytes()).await?;
                stream_to_sink(name, source, sink, &mut source_errors).await?;
                sink.write_all(CRLF).await?;
            }
        }
    }

    sink.write_all(part_close(&boundary).as_bytes()).await?;
    Ok(source_errors)
}

pub(super) fn encode_sync<W: Write>(form: &FormData, sink: &mut W) -> Result<()> {
    let boundary = form.boundary();

    for (name, field) in form.entries() {
        match field {
            Field::Scalar(value) => {
                for (key, text) in flatten(name, value) {
                    sink.write_all(part_open(boundary).as_bytes())?;
                    sink.write_all(scalar_part_header(&key).as_bytes())?;
                    sink.write_all(text.as_bytes())?;
                    sink.write_all(CRLF)?;
                }
            }
            Field::File {
                path,
                filename,
                content_type,
            } => {
                sink.write_all(part_open(boundary).as_bytes())?;
                sink.write_all(file_part_header(name, filename, content_type).as_bytes())?;
                copy_file_blocking(name, path, sink)?;
                sink.write_all(CRLF)?;
            }
            Field::Stream(_) | Field::FileStream { .. } => {
                return Err(Error::StreamRequiresAsync);
            }
        }
    }

    sink.write_all(part_close(boundary).as_bytes())?;
    Ok(())
}

/// Blocking fixed-size-buffer copy of a file into the sink.
fn copy_file_blocking<W: Write>(field: &str, path: &Path, sink: &mut W) -> Result<()> {
    let mut file = std::fs::File::open(path).map_err(|error| Error::source_read(field, error))?;
    let mut buf = [0_u8; 4096];
    loop {
        let read = file
            .read(&mut buf)
            .map_err(|error| Error::source_read(field, error))?;
        if read == 0 {
            break;
        }
        sink.write_all(buf.get(..read).unwrap_or_default())?;
    }
    Ok(())
}
