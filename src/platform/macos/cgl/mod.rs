// portgfx/src/platform/macos/cgl/mod.rs
//
//! Bindings to Apple's OpenGL implementation on macOS via CGL.

mod context;
mod error;

pub use self::context::{CglBackend, CglContext};
pub use self::context::CglBackend as NativeBackend;
