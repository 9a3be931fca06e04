//! Error contract shared by every error surfaced over HTTP.
//!
//! DESIGN
//! ======
//! Each module owns its `thiserror` enum. Errors that reach a client also
//! implement [`ErrorCode`] so responses carry a stable, grepable code and a
//! retry hint next to the human-readable message.

/// Grepable error code + retry hint for errors that leave the process.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Language used for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Pick a locale from an `Accept-Language` header value.
    ///
    /// The first tag wins; anything starting with `zh` selects Chinese.
    #[must_use]
    pub fn from_accept_language(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::En;
        };
        let first = raw.split(',').next().unwrap_or("").trim().to_ascii_lowercase();
        if first.starts_with("zh") { Self::Zh } else { Self::En }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
