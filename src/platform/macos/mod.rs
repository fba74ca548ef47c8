// portgfx/src/platform/macos/mod.rs
//
//! Bindings to Apple's OpenGL implementation on macOS.

pub mod cgl;
