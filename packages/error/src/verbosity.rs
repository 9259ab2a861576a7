//! Process-wide verbosity registry
//!
//! The registry holds two scalars read by every rendering call: the current
//! [`Verbosity`] tier and the stack depth limit used at [`Verbosity::Trace`].
//! Both are plain atomics, so reads never block and concurrent writers only
//! race on which value wins, never on memory safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use thiserror::Error;

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Info as u8);

// 0 means unlimited
static STACK_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// How much of an error is disclosed when it is rendered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Verbosity {
    /// Code and message only
    #[default]
    Info = 0,
    /// Adds a prefix of the details and the cause
    Verbose = 1,
    /// Adds call-site attribution
    Debug = 2,
    /// Adds the full stack trace
    Trace = 3,
}

impl Verbosity {
    /// All tiers, lowest disclosure first
    pub const ALL: [Verbosity; 4] = [
        Verbosity::Info,
        Verbosity::Verbose,
        Verbosity::Debug,
        Verbosity::Trace,
    ];

    /// Map any integer onto a tier, clamping out-of-range values
    #[must_use]
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Verbosity::Info,
            1 => Verbosity::Verbose,
            2 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }

    /// Ordinal of the tier, also the maximum number of details shown at it
    #[must_use]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Lowercase name of the tier
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Info => "info",
            Verbosity::Verbose => "verbose",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        }
    }

    fn from_u8(raw: u8) -> Self {
        Self::from_level(i64::from(raw))
    }
}

impl From<i64> for Verbosity {
    fn from(level: i64) -> Self {
        Self::from_level(level)
    }
}

impl From<i32> for Verbosity {
    fn from(level: i32) -> Self {
        Self::from_level(i64::from(level))
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no verbosity tier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown verbosity `{0}`")]
pub struct ParseVerbosityError(pub String);

impl FromStr for Verbosity {
    type Err = ParseVerbosityError;

    /// Accepts a tier name (any case) or an integer, which is clamped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(level) = trimmed.parse::<i64>() {
            return Ok(Self::from_level(level));
        }
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseVerbosityError(s.to_string()))
    }
}

/// Set the process-wide verbosity tier
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Current process-wide verbosity tier, [`Verbosity::Info`] until first set
#[must_use]
pub fn verbosity() -> Verbosity {
    Verbosity::from_u8(VERBOSITY.load(Ordering::Relaxed))
}

/// Limit the number of frames captured at [`Verbosity::Trace`]
///
/// `None` (or `Some(0)`) removes the limit.
pub fn set_stack_depth(depth: Option<usize>) {
    STACK_DEPTH.store(depth.unwrap_or(0), Ordering::Relaxed);
}

/// Current stack depth limit, `None` when unlimited
#[must_use]
pub fn stack_depth() -> Option<usize> {
    match STACK_DEPTH.load(Ordering::Relaxed) {
        0 => None,
        depth => Some(depth),
    }
}
