//! Call-site capture
//!
//! Rendering asks a [`CallSiteResolver`] for frames instead of walking the
//! stack itself, so the policy in [`crate::render`] can be exercised with
//! fixed frames. [`BacktraceResolver`] is the resolver used by default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Placeholder for anything a frame could not be resolved to
pub const UNRESOLVED: &str = "??";

/// One call-site record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackFrame {
    /// Short (base) name of the source file
    pub file: String,
    /// Line number, 0 when unknown
    pub line: u32,
    /// Demangled function path
    pub function: String,
}

impl StackFrame {
    /// Build a frame, shortening `file` to its base name
    pub fn new(file: &str, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: short_file_name(file),
            line,
            function: function.into(),
        }
    }

    /// Frame pointing at a tracked caller location, function unknown
    #[must_use]
    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), UNRESOLVED)
    }

    /// A frame nothing could be resolved for
    #[must_use]
    pub fn unresolved() -> Self {
        Self {
            file: UNRESOLVED.to_string(),
            line: 0,
            function: UNRESOLVED.to_string(),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file, self.line, self.function)
    }
}

/// Captured frames, innermost call first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack(pub Vec<StackFrame>);

impl Stack {
    /// The attribution frame
    #[must_use]
    pub fn first(&self) -> Option<&StackFrame> {
        self.0.first()
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no frame was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate frames innermost first
    pub fn iter(&self) -> std::slice::Iter<'_, StackFrame> {
        self.0.iter()
    }
}

impl From<Vec<StackFrame>> for Stack {
    fn from(frames: Vec<StackFrame>) -> Self {
        Self(frames)
    }
}

impl FromIterator<StackFrame> for Stack {
    fn from_iter<I: IntoIterator<Item = StackFrame>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a StackFrame;
    type IntoIter = std::slice::Iter<'a, StackFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One `file:line function` record per line
impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{frame}")?;
        }
        Ok(())
    }
}

/// What a renderer wants captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Location of the call into the rendering entry point, when tracked
    pub origin: Option<&'static Location<'static>>,
    /// Maximum number of frames, `None` for the whole stack
    pub limit: Option<usize>,
}

impl CaptureRequest {
    /// Request only the attribution frame
    #[must_use]
    pub fn attribution(origin: Option<&'static Location<'static>>) -> Self {
        Self {
            origin,
            limit: Some(1),
        }
    }

    /// Request frames up to `limit`
    #[must_use]
    pub fn full(origin: Option<&'static Location<'static>>, limit: Option<usize>) -> Self {
        Self { origin, limit }
    }
}

/// Source of call-site frames for rendering
///
/// Implementations must return frame 0 as the caller of the rendering entry
/// point and must not fail: frames that cannot be resolved degrade to
/// [`UNRESOLVED`] fields.
pub trait CallSiteResolver: Send + Sync {
    /// Capture frames for `request`, innermost first
    fn capture(&self, request: CaptureRequest) -> Stack;
}

/// Resolver backed by the `backtrace` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceResolver;

impl CallSiteResolver for BacktraceResolver {
    #[cfg(feature = "full-backtrace")]
    fn capture(&self, request: CaptureRequest) -> Stack {
        walk::capture(request)
    }

    #[cfg(not(feature = "full-backtrace"))]
    fn capture(&self, request: CaptureRequest) -> Stack {
        let frame = request
            .origin
            .map_or_else(StackFrame::unresolved, StackFrame::from_location);
        Stack(vec![frame])
    }
}

fn short_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| path.to_string(), str::to_string)
}

/// Frames whose function belongs to this crate, the unwinder or the
/// formatting machinery; never reported as the attribution point.
///
/// Trait methods are judged by their self type, so a caller's own
/// `<app::Report as core::fmt::Display>::fmt` stays outside. Blanket impls
/// over a bare type parameter (`<T as alloc::string::ToString>`) are judged
/// by the trait instead.
#[cfg_attr(not(feature = "full-backtrace"), allow(dead_code))]
fn is_internal(function: &str) -> bool {
    let Some(qualified) = function.strip_prefix('<') else {
        return is_internal_path(function);
    };
    let (self_ty, trait_path) = qualified.split_once(" as ").unwrap_or((qualified, ""));
    let self_ty = self_ty
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ");

    if self_ty.contains("::") {
        is_internal_path(self_ty)
    } else {
        is_internal_path(trait_path)
    }
}

#[cfg_attr(not(feature = "full-backtrace"), allow(dead_code))]
fn is_internal_path(path: &str) -> bool {
    const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
    const MACHINERY: [&str; 8] = [
        "backtrace::",
        "core::fmt::",
        "alloc::fmt::",
        "std::fmt::",
        "alloc::string::",
        "serde::ser::",
        "serde_json::",
        "_Unwind_",
    ];

    path.starts_with(CRATE_PREFIX) || MACHINERY.iter().any(|m| path.starts_with(m))
}

#[cfg(feature = "full-backtrace")]
mod walk {
    use super::{is_internal, short_file_name, CaptureRequest, Stack, StackFrame, UNRESOLVED};
    use log::trace;
    use std::panic::Location;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Default)]
    struct RawFrame {
        path: Option<PathBuf>,
        line: Option<u32>,
        function: Option<String>,
    }

    impl RawFrame {
        fn from_symbol(symbol: &backtrace::Symbol) -> Self {
            Self {
                path: symbol.filename().map(Path::to_path_buf),
                line: symbol.lineno(),
                function: symbol.name().map(|name| format!("{name:#}")),
            }
        }

        /// Named and not part of this crate or the machinery around it
        fn is_outside(&self) -> bool {
            self.function.as_deref().is_some_and(|f| !is_internal(f))
        }

        fn is_at(&self, origin: &Location<'_>) -> bool {
            self.line == Some(origin.line())
                && self
                    .path
                    .as_deref()
                    .is_some_and(|path| path.ends_with(origin.file()))
        }

        fn into_frame(self) -> StackFrame {
            let file = self
                .path
                .as_deref()
                .and_then(Path::to_str)
                .map_or_else(|| UNRESOLVED.to_string(), short_file_name);
            StackFrame {
                file,
                line: self.line.unwrap_or(0),
                function: self.function.unwrap_or_else(|| UNRESOLVED.to_string()),
            }
        }
    }

    /// Frame collector fed innermost first; says when the walk can stop
    ///
    /// Frames are kept from the anchor on: the frame at the tracked origin,
    /// or the first outside frame when there is no origin. While an origin is
    /// still unmatched, outside frames are kept as a fallback in case no
    /// frame carries debug info for it.
    struct Walk {
        origin: Option<&'static Location<'static>>,
        limit: Option<usize>,
        anchored: bool,
        frames: Vec<StackFrame>,
        fallback: Vec<StackFrame>,
    }

    impl Walk {
        fn new(request: CaptureRequest) -> Self {
            Self {
                origin: request.origin,
                limit: request.limit,
                anchored: false,
                frames: Vec::new(),
                fallback: Vec::new(),
            }
        }

        fn has_room(&self, held: usize) -> bool {
            self.limit.map_or(true, |limit| held < limit)
        }

        /// Feed the next frame; `false` once enough frames are held
        fn push(&mut self, raw: RawFrame) -> bool {
            if !self.anchored {
                let anchor = match self.origin {
                    Some(origin) => raw.is_at(origin),
                    None => raw.is_outside(),
                };
                if !anchor {
                    self.remember(raw);
                    return true;
                }
                self.anchored = true;
            }
            self.frames.push(raw.into_frame());
            self.has_room(self.frames.len())
        }

        fn remember(&mut self, raw: RawFrame) {
            if self.origin.is_none() || (self.fallback.is_empty() && !raw.is_outside()) {
                return;
            }
            if self.has_room(self.fallback.len()) {
                self.fallback.push(raw.into_frame());
            }
        }

        fn finish(self) -> Stack {
            let mut frames = match (self.anchored, self.origin) {
                (false, Some(origin)) => {
                    trace!(
                        "No frame matched {}:{}, attributing from the tracked location",
                        origin.file(),
                        origin.line()
                    );
                    let mut rest = self.fallback.into_iter();
                    let mut first = StackFrame::from_location(origin);
                    if let Some(caller) = rest.next() {
                        first.function = caller.function;
                    }
                    std::iter::once(first).chain(rest).collect()
                }
                _ => self.frames,
            };

            if let Some(limit) = self.limit {
                frames.truncate(limit);
            }
            if frames.is_empty() {
                frames.push(match self.origin {
                    Some(origin) => StackFrame::from_location(origin),
                    None => StackFrame::unresolved(),
                });
            }
            Stack(frames)
        }
    }

    pub(super) fn capture(request: CaptureRequest) -> Stack {
        let mut walk = Walk::new(request);
        backtrace::trace(|frame| {
            let mut more = true;
            let mut resolved = false;
            // Inlined calls resolve to several symbols, innermost first.
            backtrace::resolve_frame(frame, |symbol| {
                resolved = true;
                if more {
                    more = walk.push(RawFrame::from_symbol(symbol));
                }
            });
            if !resolved {
                more = walk.push(RawFrame::default());
            }
            more
        });
        walk.finish()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn named(function: &str, file: &str, line: u32) -> RawFrame {
            RawFrame {
                path: Some(PathBuf::from(file)),
                line: Some(line),
                function: Some(function.to_string()),
            }
        }

        /// Feeds frames until the walk asks to stop, returning how many it took
        fn feed(walk: &mut Walk, frames: Vec<RawFrame>) -> usize {
            let mut taken = 0;
            for frame in frames {
                taken += 1;
                if !walk.push(frame) {
                    break;
                }
            }
            taken
        }

        fn deep_stack() -> Vec<RawFrame> {
            vec![
                named("backtrace::backtrace::trace", "backtrace.rs", 1),
                named("strata_error::render::Renderer::render", "mod.rs", 100),
                named("core::fmt::write", "mod.rs", 1200),
                named("app::handler", "/src/handler.rs", 41),
                named("app::server", "/src/server.rs", 88),
                named("app::main", "/src/main.rs", 7),
                named("std::rt::lang_start", "rt.rs", 1),
            ]
        }

        #[test]
        fn test_unresolved_raw_frame() {
            let frame = RawFrame::default().into_frame();
            assert_eq!(frame, StackFrame::unresolved());
            assert_eq!(frame.to_string(), "??:0 ??");
        }

        #[test]
        fn test_attribution_stops_after_one_frame() {
            let mut walk = Walk::new(CaptureRequest::attribution(None));
            assert_eq!(feed(&mut walk, deep_stack()), 4);

            let stack = walk.finish();
            assert_eq!(stack.len(), 1);
            assert_eq!(stack.first().map(|f| f.line), Some(41));
        }

        #[test]
        fn test_depth_limit_bounds_the_walk() {
            let mut walk = Walk::new(CaptureRequest::full(None, Some(2)));
            assert_eq!(feed(&mut walk, deep_stack()), 5);

            let functions: Vec<String> = walk.finish().iter().map(|f| f.function.clone()).collect();
            assert_eq!(functions, ["app::handler", "app::server"]);
        }

        #[test]
        fn test_unlimited_walk_takes_everything() {
            let mut walk = Walk::new(CaptureRequest::full(None, None));
            assert_eq!(feed(&mut walk, deep_stack()), 7);
            assert_eq!(walk.finish().len(), 4);
        }

        #[test]
        fn test_origin_anchors_and_stops() {
            let origin = Location::caller();
            let mut frames = deep_stack();
            frames.insert(3, named("app::render_site", origin.file(), origin.line()));

            let mut walk = Walk::new(CaptureRequest::attribution(Some(origin)));
            assert_eq!(feed(&mut walk, frames), 4);

            let stack = walk.finish();
            assert_eq!(stack.len(), 1);
            assert_eq!(stack.first().map(|f| f.line), Some(origin.line()));
            assert_eq!(stack.first().map(|f| f.function.as_str()), Some("app::render_site"));
        }

        #[test]
        fn test_unmatched_origin_falls_back_to_location() {
            let origin = Location::caller();
            let mut walk = Walk::new(CaptureRequest::full(Some(origin), Some(2)));
            assert_eq!(feed(&mut walk, deep_stack()), 7);

            let stack = walk.finish();
            assert_eq!(stack.len(), 2);
            let first = stack.first().expect("attribution frame");
            assert_eq!(first.file, "stack.rs");
            assert_eq!(first.line, origin.line());
            assert_eq!(first.function, "app::handler");
            assert_eq!(stack.0[1].function, "app::server");
        }
    }
}
