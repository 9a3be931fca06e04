//! Output normalization: provider output → ordered list of image URLs.
//!
//! DESIGN
//! ======
//! `classify_output` is the only place that inspects the raw output shape.
//! It yields an [`OutputShape`] that `normalize` matches exhaustively, so a
//! new shape is a compile error rather than a silent fallthrough.
//!
//! Byte streams are drained in receipt order and inlined as a PNG data URI.
//! A streamed response always produces exactly one image.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use serde_json::Value;

use crate::upstream::{ByteStream, RawOutput, UpstreamError};

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

// =============================================================================
// TYPES
// =============================================================================

/// The recognized shapes of a provider output.
pub enum OutputShape {
    StringUrl(String),
    UrlArray(Vec<String>),
    ByteStream(ByteStream),
    /// Value of the `url` field of an object output, not yet type-checked.
    UrlObject(Value),
    Unrecognized(Unrecognized),
}

/// Why an output could not be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unrecognized {
    /// Null, false, empty string or another falsy value.
    Empty,
    /// A list whose first item is neither a URL nor a stream (or no items).
    ListItem(&'static str),
    /// Any other value.
    Other(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The output had a list shape we do not understand.
    #[error("unsupported output item: {0}")]
    Format(String),
    /// Output was empty, unrecognized, or carried no usable URL.
    #[error("no usable image in output: {0}")]
    Failed(String),
    /// Draining a byte stream failed midway.
    #[error("image stream processing failed: {0}")]
    Stream(#[source] UpstreamError),
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Sort a raw provider output into exactly one [`OutputShape`].
#[must_use]
pub fn classify_output(raw: RawOutput) -> OutputShape {
    match raw {
        RawOutput::Stream(stream) => OutputShape::ByteStream(stream),
        RawOutput::StreamList(streams) => match streams.into_iter().next() {
            Some(first) => OutputShape::ByteStream(first),
            None => OutputShape::Unrecognized(Unrecognized::ListItem("empty list")),
        },
        RawOutput::Json(value) => classify_value(value),
    }
}

fn classify_value(value: Value) -> OutputShape {
    match value {
        Value::String(url) if url.is_empty() => OutputShape::Unrecognized(Unrecognized::Empty),
        Value::String(url) => OutputShape::StringUrl(url),
        Value::Array(items) => {
            if !matches!(items.first(), Some(Value::String(_))) {
                let kind = items.first().map_or("empty list", json_kind);
                return OutputShape::Unrecognized(Unrecognized::ListItem(kind));
            }
            OutputShape::UrlArray(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )
        }
        Value::Object(mut map) => match map.remove("url") {
            Some(url) => OutputShape::UrlObject(url),
            None => OutputShape::Unrecognized(Unrecognized::Other("object without url")),
        },
        Value::Null | Value::Bool(false) => OutputShape::Unrecognized(Unrecognized::Empty),
        other => OutputShape::Unrecognized(Unrecognized::Other(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Turn a provider output into a non-empty, ordered list of image URLs.
///
/// # Errors
///
/// [`NormalizeError::Format`] for lists of unsupported items,
/// [`NormalizeError::Stream`] when a byte stream breaks, and
/// [`NormalizeError::Failed`] for every other unusable output.
pub async fn normalize(raw: RawOutput) -> Result<Vec<String>, NormalizeError> {
    let urls = match classify_output(raw) {
        OutputShape::StringUrl(url) => vec![url],
        OutputShape::UrlArray(urls) if urls.first().is_some_and(String::is_empty) => {
            return Err(NormalizeError::Failed("first image url is empty".into()));
        }
        OutputShape::UrlArray(mut urls) => {
            urls.retain(|u| !u.is_empty());
            urls
        }
        OutputShape::ByteStream(stream) => vec![drain_to_data_uri(stream).await?],
        OutputShape::UrlObject(Value::String(url)) if !url.is_empty() => vec![url],
        OutputShape::UrlObject(_) => return Err(NormalizeError::Failed("url field is not a string".into())),
        OutputShape::Unrecognized(Unrecognized::ListItem(kind)) => return Err(NormalizeError::Format(kind.into())),
        OutputShape::Unrecognized(Unrecognized::Empty) => return Err(NormalizeError::Failed("empty output".into())),
        OutputShape::Unrecognized(Unrecognized::Other(kind)) => return Err(NormalizeError::Failed(kind.into())),
    };
    if urls.is_empty() {
        return Err(NormalizeError::Failed("no string entries in output list".into()));
    }
    Ok(urls)
}

/// Drain a byte stream and inline it as a PNG data URI.
///
/// # Errors
///
/// Fails if any chunk errors or the stream carries no bytes at all.
pub async fn drain_to_data_uri(mut stream: ByteStream) -> Result<String, NormalizeError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk.map_err(NormalizeError::Stream)?);
    }
    if buffer.is_empty() {
        return Err(NormalizeError::Failed("empty image stream".into()));
    }
    Ok(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(&buffer)))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
