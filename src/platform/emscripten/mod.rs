// portgfx/src/platform/emscripten/mod.rs
//
//! Bindings to WebGL through Emscripten's EGL emulation.

mod context;

pub use self::context::EmscriptenBackend;
pub use self::context::EmscriptenBackend as NativeBackend;
