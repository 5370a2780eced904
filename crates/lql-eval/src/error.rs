//! Route-registration error types.
//!
//! Evaluation itself is total (`matches` returns `bool`, never errors); only
//! registering a rule set with the [`Router`](crate::Router) can fail.

use thiserror::Error;

/// Errors that can occur while registering a route.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A `~` filter carries a pattern that is not a valid regex. Rule sets
    /// from the parser are pre-validated; this guards rules loaded from
    /// external storage.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EvalError>;
