//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Mutex, MutexGuard};
use strata_error::{
    set_stack_depth, set_verbosity, CallSiteResolver, CaptureRequest, Stack, StackFrame, Verbosity,
};

static REGISTRY: Mutex<()> = Mutex::new(());

/// Holds the process-wide registry for one test and resets it on drop
pub struct RegistryGuard {
    _lock: MutexGuard<'static, ()>,
}

impl RegistryGuard {
    pub fn set(&self, level: Verbosity) {
        set_verbosity(level);
    }
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        set_verbosity(Verbosity::Info);
        set_stack_depth(None);
    }
}

/// Serialise access to the registry and start from its defaults
pub fn registry() -> RegistryGuard {
    let _ = env_logger::builder().is_test(true).try_init();
    let lock = REGISTRY
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    set_verbosity(Verbosity::Info);
    set_stack_depth(None);
    RegistryGuard { _lock: lock }
}

/// Resolver returning fixed frames, truncated to the requested limit
pub struct FixedResolver(pub Vec<StackFrame>);

impl FixedResolver {
    pub fn sample() -> Self {
        Self(vec![
            StackFrame::new("handler.rs", 41, "app::handler::load"),
            StackFrame::new("server.rs", 88, "app::server::dispatch"),
            StackFrame::new("main.rs", 7, "app::main"),
        ])
    }
}

impl CallSiteResolver for FixedResolver {
    fn capture(&self, request: CaptureRequest) -> Stack {
        let limit = request.limit.unwrap_or(self.0.len());
        self.0.iter().take(limit).cloned().collect()
    }
}

pub fn sample_error(code: i64) -> strata_error::Error {
    strata_error::Error::new(code, ["error message", "error details", "error hint"])
}
