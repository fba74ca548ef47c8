// portgfx/src/platform/generic/egl/library.rs
//
//! Loading of the EGL entry points.

use crate::egl::Egl;
use crate::library::Library;

use std::os::raw::c_void;
use std::ptr;

#[cfg(target_os = "windows")]
static EGL_LIBRARY_NAMES: &[&str] = &["libEGL.dll"];
#[cfg(target_os = "android")]
static EGL_LIBRARY_NAMES: &[&str] = &["libEGL.so"];
#[cfg(not(any(target_os = "windows", target_os = "android", target_os = "emscripten")))]
static EGL_LIBRARY_NAMES: &[&str] = &["libEGL.so.1", "libEGL.so"];

thread_local! {
    pub(crate) static EGL_FUNCTIONS: Egl = Egl::load_with(get_proc_address);
}

#[cfg(not(target_os = "emscripten"))]
lazy_static! {
    static ref EGL_LIBRARY: Option<Library> = Library::open(EGL_LIBRARY_NAMES);
}

// Emscripten links EGL statically.
#[cfg(target_os = "emscripten")]
lazy_static! {
    static ref EGL_LIBRARY: Option<Library> = Library::process();
}

/// Whether the EGL library could be loaded. No entry point of `EGL_FUNCTIONS` may be called
/// otherwise.
pub(crate) fn is_available() -> bool {
    EGL_LIBRARY.is_some()
}

fn get_proc_address(symbol_name: &str) -> *const c_void {
    match *EGL_LIBRARY {
        Some(ref library) => library.symbol_str(symbol_name),
        None => ptr::null(),
    }
}
