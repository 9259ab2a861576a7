//! Display, serialization and trait implementations for Error

use super::types::Error;
use crate::render::{self, Renderer};
use serde::{Serialize, Serializer};
use std::fmt;

/// Text rendering at the current verbosity
///
/// Formatting goes through the standard machinery, so the attribution frame
/// is the first frame outside this crate and the formatter rather than a
/// `#[track_caller]` location. Use [`Error::render`] for exact attribution.
///
/// Inside another render on the same thread (a foreign cause forwarding its
/// `Display` here) only the body is written, at the tier already in use.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(written) = render::write_nested(f, self) {
            return written;
        }
        fmt::Display::fmt(&Renderer::current().render_untracked(self), f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner
            .cause
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Serializes the structured record at the current verbosity
impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Renderer::current()
            .record_untracked(self)
            .serialize(serializer)
    }
}
