//! Structured error values
//!
//! An [`Error`] carries:
//! - a caller-assigned numeric code, stable for matching
//! - a primary message
//! - ordered auxiliary details, disclosed progressively with verbosity
//! - an optional cause, forming a singly linked causal chain

pub mod constructors;
pub mod display;
pub mod macros;
pub mod types;

pub use constructors::Chain;
pub use types::{Cause, Error, Result};
