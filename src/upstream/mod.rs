//! Upstream: adapter for the hosted inference provider.
//!
//! DESIGN
//! ======
//! The gateway only sees the [`ImageModel`] trait and the provider-neutral
//! [`RawOutput`]/[`UpstreamError`] types. [`connect`] is the single place a
//! concrete provider client is built from config.

pub mod classify;
pub mod config;
pub mod replicate;
pub mod types;

use std::sync::Arc;

use config::UpstreamConfig;
pub use types::{ByteStream, ImageModel, RawOutput, UpstreamError};

/// Build the provider client when a credential is configured.
///
/// Returns `Ok(None)` without a credential so the service can still start.
///
/// # Errors
///
/// Returns an error if the HTTP client fails to build.
pub fn connect(config: &UpstreamConfig) -> Result<Option<Arc<dyn ImageModel>>, UpstreamError> {
    let Some(token) = config.api_token.clone() else {
        return Ok(None);
    };
    let client = replicate::ReplicateClient::new(token, config)?;
    Ok(Some(Arc::new(client)))
}
