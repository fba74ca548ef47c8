//! Cross-platform tracking of native OpenGL and OpenGL ES rendering contexts.
//!
//! `portgfx` creates native contexts through whichever windowing API the target provides (EGL,
//! GLX, WGL, ANGLE, OSMesa, CGL or Emscripten's WebGL bridge), remembers which [`GlContext`] is
//! current on every thread, and wraps contexts that were created by someone else so that code
//! issuing GL calls never needs to know which backend is active.
//!
//! Exactly one backend is compiled into a binary; see [`platform::default`].

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod platform;
pub use platform::default::NativeBackend;

pub mod error;
pub use crate::error::{Error, WindowingApiError};

mod context;
pub use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};

mod gl_context;
pub use crate::gl_context::{CurrentContextGuard, GlContext, GlContextPtr};

mod gl_utils;
pub use crate::gl_utils::{is_extension_supported, is_extension_supported_in_current_context};
pub use crate::gl_utils::set_swap_interval;

pub mod perf;

#[cfg(any(unix, windows))]
mod library;
mod proc_address;
mod registry;
mod stamp;

#[cfg(any_egl)]
#[allow(non_camel_case_types)]
mod egl {
    use std::os::raw::{c_long, c_void};
    pub type khronos_utime_nanoseconds_t = khronos_uint64_t;
    pub type khronos_uint64_t = u64;
    pub type khronos_ssize_t = c_long;
    pub type EGLint = i32;
    pub type EGLNativeDisplayType = *const c_void;
    pub type EGLNativePixmapType = *const c_void;
    pub type EGLNativeWindowType = *const c_void;
    pub type NativeDisplayType = EGLNativeDisplayType;
    pub type NativePixmapType = EGLNativePixmapType;
    pub type NativeWindowType = EGLNativeWindowType;
    include!(concat!(env!("OUT_DIR"), "/egl_bindings.rs"));
}

#[cfg(test)]
mod tests;
