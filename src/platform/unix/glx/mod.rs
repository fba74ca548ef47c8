// portgfx/src/platform/unix/glx/mod.rs
//
//! Bindings to GLX via Xlib.
//!
//! Xlib and libGL are loaded when the first context is created, so binaries built with this
//! backend still start on machines without X11.

mod context;
mod ffi;

pub use self::context::{GlxBackend, GlxContext};
pub use self::context::GlxBackend as NativeBackend;
