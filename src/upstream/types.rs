//! Upstream types: provider-neutral output shapes and errors.

use futures::stream::BoxStream;
use serde_json::Value;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by inference provider operations.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP request to the provider failed before a response arrived.
    #[error("upstream request failed: {message}")]
    Request { message: String, timeout: bool },

    /// The provider returned a non-success HTTP status.
    #[error("upstream response error: status {status}: {body}")]
    Status { status: u16, body: String },

    /// The prediction ran and ended in the `failed` state.
    #[error("prediction failed: {0}")]
    Prediction(String),

    /// The prediction was canceled on the provider side.
    #[error("prediction canceled")]
    Canceled,

    /// The provider response body could not be deserialized.
    #[error("upstream response parse failed: {0}")]
    Parse(String),

    /// A streamed output broke off mid-transfer.
    #[error("output stream failed: {0}")]
    Stream(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl UpstreamError {
    /// Provider-originated text, without our own prefix.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Request { message, .. } => message,
            Self::Status { body, .. } => body,
            Self::Prediction(msg) | Self::Parse(msg) | Self::Stream(msg) | Self::HttpClientBuild(msg) => msg,
            Self::Canceled => "prediction canceled",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        let timeout = e.is_timeout();
        Self::Request { message: e.without_url().to_string(), timeout }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Binary output delivered chunk by chunk, in receipt order.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, UpstreamError>>;

/// Whatever the provider handed back for one prediction, before normalization.
pub enum RawOutput {
    /// A JSON value: string URL, array, object, or anything else.
    Json(Value),
    /// A single binary stream returned directly.
    Stream(ByteStream),
    /// A list whose items are binary streams.
    StreamList(Vec<ByteStream>),
}

impl std::fmt::Debug for RawOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::StreamList(items) => write!(f, "StreamList(len={})", items.len()),
        }
    }
}

// =============================================================================
// IMAGE MODEL TRAIT
// =============================================================================

/// Provider-neutral async trait for running an image model. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ImageModel: Send + Sync {
    /// Run `model` with the given input object and wait for its output.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] if the request fails, the prediction
    /// fails or is canceled, or the response is malformed.
    async fn run(&self, model: &str, input: &Value) -> Result<RawOutput, UpstreamError>;
}
