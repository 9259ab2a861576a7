//! Environment-driven configuration of the verbosity registry
//!
//! Recognised variables:
//! - `STRATA_VERBOSITY` - tier name (`info`, `verbose`, `debug`, `trace`) or an integer
//! - `STRATA_STACK_DEPTH` - maximum frames captured at the trace tier, `0` for unlimited

use crate::verbosity::{self, Verbosity};
use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Variable holding the verbosity tier
pub const VERBOSITY_VAR: &str = "STRATA_VERBOSITY";

/// Variable holding the trace-tier stack depth limit
pub const STACK_DEPTH_VAR: &str = "STRATA_STACK_DEPTH";

static ENV_CONFIG: OnceCell<Config> = OnceCell::new();

/// Rendering configuration applied to the process-wide registry
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tier used by [`crate::Error::render`] and friends
    pub verbosity: Verbosity,
    /// Frame limit at [`Verbosity::Trace`], `None` for unlimited
    pub stack_depth: Option<usize>,
}

impl Config {
    /// Read the configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// Values that fail to parse are logged and skipped, leaving the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(VERBOSITY_VAR) {
            match raw.parse::<Verbosity>() {
                Ok(level) => config.verbosity = level,
                Err(e) => warn!("Ignoring {VERBOSITY_VAR}: {e}"),
            }
        }

        if let Some(raw) = lookup(STACK_DEPTH_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(0) => config.stack_depth = None,
                Ok(depth) => config.stack_depth = Some(depth),
                Err(e) => warn!("Ignoring {STACK_DEPTH_VAR}={raw:?}: {e}"),
            }
        }

        config
    }

    /// Write this configuration into the process-wide registry
    pub fn apply(&self) {
        verbosity::set_verbosity(self.verbosity);
        verbosity::set_stack_depth(self.stack_depth);
        debug!(
            "Error verbosity set to {} (stack depth: {:?})",
            self.verbosity, self.stack_depth
        );
    }
}

/// Apply [`Config::from_env`] once per process and return the applied snapshot
///
/// Later calls return the first snapshot without touching the registry, so
/// explicit [`crate::set_verbosity`] calls made afterwards are kept.
pub fn init_from_env() -> &'static Config {
    ENV_CONFIG.get_or_init(|| {
        let config = Config::from_env();
        config.apply();
        config
    })
}
