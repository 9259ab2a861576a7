//! Structured error values with verbosity-tiered rendering
//!
//! This crate provides:
//! - [`Error`], a value carrying a numeric code, a message, ordered details
//!   and an optional cause
//! - a process-wide [`Verbosity`] registry deciding how much of an error is
//!   rendered
//! - text and JSON rendering gated by that registry, with call-site
//!   attribution and stack traces at the higher tiers
//!
//! ```
//! use strata_error::{set_verbosity, Error, Verbosity};
//!
//! let e = Error::new(10, ["error message", "error details", "error hint"])
//!     .wrap(Error::new(2, ["wrapped error message", "wrapped error details"]));
//!
//! set_verbosity(Verbosity::Verbose);
//! assert_eq!(
//!     e.render(),
//!     "error 10: error message | error details\n\
//!      cause: error 2: wrapped error message | wrapped error details"
//! );
//! # set_verbosity(Verbosity::Info);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod render;
pub mod stack;
pub mod verbosity;

pub use config::{init_from_env, Config};
pub use error::{Cause, Chain, Error, Result};
pub use render::{RenderError, Renderer, Structured, TextView};
pub use stack::{BacktraceResolver, CallSiteResolver, CaptureRequest, Stack, StackFrame};
pub use verbosity::{
    set_stack_depth, set_verbosity, stack_depth, verbosity, ParseVerbosityError, Verbosity,
};
