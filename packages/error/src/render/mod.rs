//! Verbosity-gated rendering
//!
//! What each tier discloses:
//!
//! | tier      | text                                   | structured                              |
//! |-----------|----------------------------------------|-----------------------------------------|
//! | `Info`    | `error <code>: <message>`              | `error_code`, `error_message`           |
//! | `Verbose` | + details prefix, cause line           | + `error_details`                       |
//! | `Debug`   | + `<file>:<line>: ` attribution prefix | + `cause` (same-tier subset), `stack`   |
//! | `Trace`   | + full stack, one frame per line       | + full `stack`                          |
//!
//! At most `min(details, ordinal)` details are shown, in insertion order.
//! The registry is read once per top-level call; nested causes render at
//! that same tier and never capture frames of their own. That includes an
//! [`Error`] reached through a foreign cause's `Display`, such as a
//! transparent wrapper enum.

mod structured;
mod text;

pub use structured::Structured;
pub use text::TextView;

use crate::error::Error;
use crate::stack::{BacktraceResolver, CallSiteResolver, CaptureRequest, Stack};
use crate::verbosity::{self, Verbosity};
use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::panic::Location;
use thiserror::Error as ThisError;

static DEFAULT_RESOLVER: BacktraceResolver = BacktraceResolver;

thread_local! {
    /// Tier of the render in progress on this thread
    static ACTIVE: Cell<Option<Verbosity>> = const { Cell::new(None) };
}

/// Marks a render in progress on this thread until dropped
pub(crate) struct ActiveRender {
    previous: Option<Verbosity>,
}

impl ActiveRender {
    pub(crate) fn enter(verbosity: Verbosity) -> Self {
        Self {
            previous: ACTIVE.replace(Some(verbosity)),
        }
    }
}

impl Drop for ActiveRender {
    fn drop(&mut self) {
        ACTIVE.set(self.previous);
    }
}

/// Write `error` as a nested cause if a render is in progress on this thread
///
/// Returns `None` when nothing is being rendered, leaving `f` untouched.
pub(crate) fn write_nested(f: &mut fmt::Formatter<'_>, error: &Error) -> Option<fmt::Result> {
    ACTIVE
        .get()
        .map(|verbosity| text::write_body(f, error, verbosity))
}

/// Failures of the structured rendering path
#[derive(Debug, ThisError)]
pub enum RenderError {
    /// The record could not be encoded as JSON
    #[error("failed to encode error record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Bytes could not be decoded into a record
    #[error("failed to decode error record: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Renders errors at a fixed verbosity
///
/// [`Renderer::current`] snapshots the process-wide registry; [`Renderer::new`]
/// renders at an explicit tier without touching it.
#[derive(Clone, Copy)]
pub struct Renderer<'r> {
    verbosity: Verbosity,
    stack_depth: Option<usize>,
    resolver: &'r dyn CallSiteResolver,
}

impl Renderer<'static> {
    /// Renderer at `verbosity` with no stack depth limit
    #[must_use]
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            stack_depth: None,
            resolver: &DEFAULT_RESOLVER,
        }
    }

    /// Renderer using the process-wide verbosity and stack depth
    #[must_use]
    pub fn current() -> Self {
        Self::new(verbosity::verbosity()).with_stack_depth(verbosity::stack_depth())
    }
}

impl<'r> Renderer<'r> {
    /// Capture frames through `resolver` instead of the default
    #[must_use]
    pub fn with_resolver<'n>(self, resolver: &'n dyn CallSiteResolver) -> Renderer<'n> {
        Renderer {
            verbosity: self.verbosity,
            stack_depth: self.stack_depth,
            resolver,
        }
    }

    /// Limit the frames captured at [`Verbosity::Trace`]
    #[must_use]
    pub fn with_stack_depth(mut self, depth: Option<usize>) -> Self {
        self.stack_depth = depth.filter(|&d| d > 0);
        self
    }

    /// Tier this renderer renders at
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Render `error` as text, attributing to the caller of this method
    #[track_caller]
    #[must_use]
    pub fn render(&self, error: &Error) -> String {
        self.text(error).to_string()
    }

    /// Text adapter for `error`, attributing to the caller of this method
    ///
    /// Frames are captured here; formatting the returned view does no further
    /// capture, so it can be written into any formatter.
    #[track_caller]
    #[must_use]
    pub fn text<'e>(&self, error: &'e Error) -> TextView<'e> {
        TextView::new(error, self.verbosity, self.capture(Some(Location::caller())))
    }

    /// Structured record for `error`, attributing to the caller of this method
    #[track_caller]
    #[must_use]
    pub fn record(&self, error: &Error) -> Structured {
        self.record_from(error, Some(Location::caller()))
    }

    /// JSON encoding of [`Renderer::record`]
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if the record cannot be encoded.
    #[track_caller]
    pub fn to_json(&self, error: &Error) -> Result<Vec<u8>, RenderError> {
        encode(&self.record_from(error, Some(Location::caller())))
    }

    pub(crate) fn render_untracked<'e>(&self, error: &'e Error) -> TextView<'e> {
        TextView::new(error, self.verbosity, self.capture(None))
    }

    pub(crate) fn record_untracked(&self, error: &Error) -> Structured {
        self.record_from(error, None)
    }

    fn record_from(&self, error: &Error, origin: Option<&'static Location<'static>>) -> Structured {
        let mut record = {
            let _active = ActiveRender::enter(self.verbosity);
            Structured::subset(error, self.verbosity)
        };
        record.stack = self.capture(origin);
        record
    }

    fn capture(&self, origin: Option<&'static Location<'static>>) -> Option<Stack> {
        let request = match self.verbosity {
            Verbosity::Info | Verbosity::Verbose => return None,
            Verbosity::Debug => CaptureRequest::attribution(origin),
            Verbosity::Trace => CaptureRequest::full(origin, self.stack_depth),
        };
        Some(self.resolver.capture(request))
    }
}

impl Default for Renderer<'static> {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Debug for Renderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("verbosity", &self.verbosity)
            .field("stack_depth", &self.stack_depth)
            .finish_non_exhaustive()
    }
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, RenderError> {
    serde_json::to_vec(value).map_err(RenderError::Encode)
}

impl Error {
    /// Render as text at the current verbosity
    ///
    /// From [`Verbosity::Debug`] up the output is prefixed with the file and
    /// line of the call to this method.
    ///
    /// ```
    /// use strata_error::{Error, Renderer, Verbosity};
    ///
    /// let e = Error::new(10, ["error message", "error details", "error hint"]);
    /// assert_eq!(Renderer::new(Verbosity::Info).render(&e), "error 10: error message");
    /// assert_eq!(
    ///     Renderer::new(Verbosity::Verbose).render(&e),
    ///     "error 10: error message | error details"
    /// );
    /// ```
    #[track_caller]
    #[must_use]
    pub fn render(&self) -> String {
        Renderer::current().render(self)
    }

    /// Structured record at the current verbosity
    #[track_caller]
    #[must_use]
    pub fn to_record(&self) -> Structured {
        Renderer::current().record(self)
    }

    /// JSON encoding of [`Error::to_record`]
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if the record cannot be encoded.
    #[track_caller]
    pub fn to_json(&self) -> Result<Vec<u8>, RenderError> {
        Renderer::current().to_json(self)
    }
}
