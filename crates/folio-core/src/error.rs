//! Error types for `folio-core`.
//!
//! Every admission outcome that is not a plain success is a [`CoreError`].
//! Callers translate these into externally visible responses; nothing in
//! this crate swallows them.

use std::time::Duration;

/// Unified error type for the admission layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The client used up its quota for the current window.
    #[error("rate limit exceeded, retry in {}s", .retry_after.as_secs().max(1))]
    RateLimitExceeded { retry_after: Duration },

    /// Username or password did not match. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The token is malformed, carries a bad signature or uses the wrong algorithm.
    #[error("invalid token")]
    InvalidToken,

    /// The token was valid but its lifetime is over.
    #[error("token expired")]
    TokenExpired,

    /// Encoding a freshly minted token failed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// Invalid limiter parameters, missing secret, malformed durations.
    /// Only produced at construction time.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// `true` for failures that require the caller to log in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidCredentials | CoreError::InvalidToken | CoreError::TokenExpired
        )
    }
}

/// Convenience alias used throughout `folio-core`.
pub type CoreResult<T> = Result<T, CoreError>;
