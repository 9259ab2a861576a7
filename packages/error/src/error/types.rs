//! Core error types and definitions

use std::sync::Arc;

/// A failure attached as the cause of an [`Error`]
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Structured error with a numeric code, a message, ordered details and an
/// optional cause
///
/// Cloning is cheap; clones share their data. Builder methods such as
/// [`Error::wrap`] consume the value and return the updated one, so a clone
/// taken earlier never observes the change.
#[derive(Debug, Clone)]
pub struct Error {
    pub(crate) inner: Arc<ErrorInner>,
}

#[derive(Debug, Clone)]
pub(crate) struct ErrorInner {
    /// Caller-assigned classification
    pub code: i64,
    /// Primary message
    pub message: String,
    /// Auxiliary details, most significant first
    pub details: Vec<String>,
    /// Underlying failure, set at most once
    pub cause: Option<Cause>,
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
