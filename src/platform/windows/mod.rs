// portgfx/src/platform/windows/mod.rs
//
//! Windows support, either via the native WGL interface or Google's ANGLE library.

#[cfg(angle)]
pub mod angle;
#[cfg(wgl)]
pub mod wgl;

mod window;
