//! Map provider failures onto the internal failure classes.
//!
//! DESIGN
//! ======
//! Typed signals first: HTTP status codes and reqwest's timeout flag. Only
//! when those say nothing specific do we fall back to keyword matching on
//! the provider's message text. The keyword table is not a stable provider
//! contract, so it lives here alone and is tested against captured samples.

use super::types::UpstreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    Timeout,
    Quota,
    ModelUnavailable,
    Unknown,
}

/// Classify an upstream error, typed signal first, message text last.
#[must_use]
pub fn classify(err: &UpstreamError) -> FailureKind {
    match err {
        UpstreamError::Request { timeout: true, .. } => FailureKind::Timeout,
        // Transport failures say nothing about the model; their text may
        // still contain the predictions URL.
        UpstreamError::Request { timeout: false, .. } => FailureKind::Unknown,
        UpstreamError::Status { status, body } => match status {
            401 | 403 => FailureKind::Auth,
            402 | 429 => FailureKind::Quota,
            404 => FailureKind::ModelUnavailable,
            408 | 504 => FailureKind::Timeout,
            _ => classify_message(body),
        },
        other => classify_message(other.detail()),
    }
}

/// Keyword heuristic over free-form provider text. Checked in priority order.
#[must_use]
pub fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["401", "unauthorized"]) {
        FailureKind::Auth
    } else if has(&["timeout", "timed out"]) {
        FailureKind::Timeout
    } else if has(&["quota", "limit", "billing"]) {
        FailureKind::Quota
    } else if has(&["model", "not found"]) {
        FailureKind::ModelUnavailable
    } else {
        FailureKind::Unknown
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
