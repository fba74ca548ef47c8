// portgfx/src/platform/windows/wgl/mod.rs
//
//! Bindings to Windows' native OpenGL implementation.

mod context;

pub use self::context::{WglBackend, WglContext};
pub use self::context::WglBackend as NativeBackend;
