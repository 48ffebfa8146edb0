//! `application/json` encoders.
//!
//! JSON mode keys the output by *field name* (not by flattened entry):
//! scalar fields contribute their raw value, file and file-stream
//! fields their filename string, and raw stream fields their fully
//! drained content as a string.

use std::io::Write;

use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::stream_to_string;
use crate::{Error, Field, FormData, Result};

/// Build the field-name-keyed value map for forms without raw stream
/// fields. Shared with the content-length computation, which rules out
/// stream fields before calling; a stream here maps to `null`.
pub(crate) fn static_value_map(form: &FormData) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    for (name, field) in form.iter() {
        let value = match field {
            Field::Scalar(value) => value.clone(),
            Field::File { filename, .. } | Field::FileStream { filename, .. } => {
                Value::String(filename.clone())
            }
            Field::Stream(_) => Value::Null,
        };
        map.insert(name.to_string(), value);
    }
    map
}

pub(super) async fn encode<W>(form: &mut FormData, sink: &mut W) -> Result<Vec<Error>>
where
    W: AsyncWrite + Unpin,
{
    let mut source_errors = Vec::new();
    let mut map = serde_json::Map::new();

    for (name, field) in form.entries_mut() {
        let value = match field {
            Field::Scalar(value) => value.clone(),
            Field::File { filename, .. } | Field::FileStream { filename, .. } => {
                Value::String(filename.clone())
            }
            Field::Stream(source) => {
                Value::String(stream_to_string(name, source, &mut source_errors).await)
            }
        };
        map.insert(name.clone(), value);
    }

    sink.write_all(&serde_json::to_vec(&map)?).await?;
    Ok(source_errors)
}

pub(super) fn encode_sync<W: Write>(form: &FormData, sink: &mut W) -> Result<()> {
    if form.iter().any(|(_, field)| matches!(field, Field::Stream(_))) {
        return Err(Error::StreamRequiresAsync);
    }
    sink.write_all(&serde_json::to_vec(&static_value_map(form))?)?;
    Ok(())
}
