//! Error constructors and methods

use super::types::{Cause, Error, ErrorInner};
use log::debug;
use std::sync::Arc;

impl Error {
    /// Create an error from a code and message parts
    ///
    /// The first part becomes the message and the remaining parts become the
    /// details, in order. Missing parts leave the message empty and the
    /// details empty.
    ///
    /// ```
    /// use strata_error::Error;
    ///
    /// let e = Error::new(10, ["error message", "error details", "error hint"]);
    /// assert_eq!(e.code(), 10);
    /// assert_eq!(e.message(), "error message");
    /// assert_eq!(e.details(), ["error details", "error hint"]);
    /// ```
    pub fn new<I, S>(code: i64, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = parts.into_iter().map(Into::<String>::into);
        let message = parts.next().unwrap_or_default();
        let details = parts.collect();

        Self {
            inner: Arc::new(ErrorInner {
                code,
                message,
                details,
                cause: None,
            }),
        }
    }

    /// Create an error with only a code
    #[must_use]
    pub fn code_only(code: i64) -> Self {
        Self::new(code, std::iter::empty::<String>())
    }

    /// Append a detail
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).details.push(detail.into());
        self
    }

    /// Attach the failure that caused this error
    ///
    /// A cause is set at most once: if one is already attached this call keeps
    /// it and drops `cause`.
    ///
    /// ```
    /// use strata_error::Error;
    ///
    /// let root = Error::new(2, ["wrapped error message"]);
    /// let e = Error::new(10, ["error message"]).wrap(root);
    /// assert!(e.cause().is_some());
    /// ```
    #[must_use]
    pub fn wrap<E>(self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.attach(Arc::new(cause))
    }

    /// Attach an already boxed failure, see [`Error::wrap`]
    #[must_use]
    pub fn wrap_boxed(self, cause: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        self.attach(Arc::from(cause))
    }

    fn attach(mut self, cause: Cause) -> Self {
        if self.inner.cause.is_some() {
            debug!(
                "error {} already has a cause, keeping it and dropping the new one",
                self.inner.code
            );
            return self;
        }
        Arc::make_mut(&mut self.inner).cause = Some(cause);
        self
    }

    /// The classification code passed at construction
    #[must_use]
    pub fn code(&self) -> i64 {
        self.inner.code
    }

    /// The primary message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// All details, most significant first
    #[must_use]
    pub fn details(&self) -> &[String] {
        &self.inner.details
    }

    /// The attached cause, if any
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.inner.cause.as_deref()
    }

    /// Walk the causal chain starting with this error
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            next: Some(self as &(dyn std::error::Error + 'static)),
        }
    }

    /// The cause when it is itself an [`Error`]
    pub(crate) fn nested(&self) -> Option<&Error> {
        self.cause()?.downcast_ref::<Error>()
    }
}

/// Iterator over a causal chain, see [`Error::chain`]
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn std::error::Error + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn std::error::Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

impl PartialEq for Error {
    /// Errors match by code, message and details; causes are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.inner.code == other.inner.code
            && self.inner.message == other.inner.message
            && self.inner.details == other.inner.details
    }
}

impl Eq for Error {}
