//! Human-readable rendering

use super::ActiveRender;
use crate::error::Error;
use crate::stack::Stack;
use crate::verbosity::Verbosity;
use std::fmt;

/// Text form of an [`Error`] at a fixed tier, with frames already captured
#[derive(Debug, Clone)]
pub struct TextView<'e> {
    error: &'e Error,
    verbosity: Verbosity,
    stack: Option<Stack>,
}

impl<'e> TextView<'e> {
    pub(crate) fn new(error: &'e Error, verbosity: Verbosity, stack: Option<Stack>) -> Self {
        Self {
            error,
            verbosity,
            stack,
        }
    }

    /// Frames captured for this view, innermost first
    #[must_use]
    pub fn stack(&self) -> Option<&Stack> {
        self.stack.as_ref()
    }
}

pub(crate) fn shown_details(details: &[String], verbosity: Verbosity) -> &[String] {
    &details[..details.len().min(verbosity.ordinal())]
}

/// `error <code>: <message>[ | details][\ncause: ...]`, recursing into
/// nested [`Error`] causes at the same tier.
pub(super) fn write_body(
    f: &mut fmt::Formatter<'_>,
    error: &Error,
    verbosity: Verbosity,
) -> fmt::Result {
    write!(f, "error {}: {}", error.code(), error.message())?;

    if verbosity < Verbosity::Verbose {
        return Ok(());
    }

    let shown = shown_details(error.details(), verbosity);
    if !shown.is_empty() {
        write!(f, " | {}", shown.join("; "))?;
    }

    if let Some(cause) = error.cause() {
        f.write_str("\ncause: ")?;
        match error.nested() {
            Some(nested) => write_body(f, nested, verbosity)?,
            None => write!(f, "{cause}")?,
        }
    }

    Ok(())
}

impl fmt::Display for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _active = ActiveRender::enter(self.verbosity);

        if let Some(frame) = self.stack.as_ref().and_then(Stack::first) {
            write!(f, "{}:{}: ", frame.file, frame.line)?;
        }

        write_body(f, self.error, self.verbosity)?;

        if self.verbosity == Verbosity::Trace {
            if let Some(stack) = &self.stack {
                write!(f, "\n{stack}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StackFrame;

    fn sample() -> Error {
        Error::new(10, ["error message", "error details", "error hint"])
    }

    #[test]
    fn test_shown_details_prefix() {
        let details = sample().details().to_vec();
        assert!(shown_details(&details, Verbosity::Info).is_empty());
        assert_eq!(shown_details(&details, Verbosity::Verbose), ["error details"]);
        assert_eq!(shown_details(&details, Verbosity::Debug), ["error details", "error hint"]);
        assert_eq!(shown_details(&details, Verbosity::Trace), ["error details", "error hint"]);
    }

    #[test]
    fn test_no_dangling_separator_without_details() {
        let e = Error::new(3, ["bare"]);
        let view = TextView::new(&e, Verbosity::Verbose, None);
        assert_eq!(view.to_string(), "error 3: bare");
    }

    #[test]
    fn test_trace_appends_frames_in_order() {
        let e = sample();
        let stack: Stack = vec![
            StackFrame::new("main.rs", 12, "app::run"),
            StackFrame::new("main.rs", 4, "app::main"),
        ]
        .into();
        let view = TextView::new(&e, Verbosity::Trace, Some(stack));
        assert_eq!(
            view.to_string(),
            "main.rs:12: error 10: error message | error details; error hint\n\
             main.rs:12 app::run\n\
             main.rs:4 app::main"
        );
    }

    #[test]
    fn test_debug_prefix_without_trace() {
        let e = sample();
        let stack: Stack = vec![StackFrame::new("lib.rs", 7, "app::f")].into();
        let view = TextView::new(&e, Verbosity::Debug, Some(stack));
        assert_eq!(
            view.to_string(),
            "lib.rs:7: error 10: error message | error details; error hint"
        );
    }
}
