// portgfx/src/platform/egl/mod.rs
//
//! Bindings to EGL on Android, and on Linux when the `gles` feature is enabled.

mod context;

pub use self::context::EglBackend;
pub use self::context::EglBackend as NativeBackend;
