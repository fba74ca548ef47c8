// portgfx/src/platform/windows/angle/mod.rs
//
//! Bindings to Direct3D via the ANGLE OpenGL-to-Direct3D translation layer on Windows.

mod context;

pub use self::context::AngleBackend;
pub use self::context::AngleBackend as NativeBackend;
