//! Lookup of GL entry points under their vendor suffixes.
//!
//! The same functionality is exported under different names depending on the vendor and on how
//! far an extension has been promoted (`glBindVertexArray`, `glBindVertexArrayOES`,
//! `glBindVertexArrayAPPLE`, ...). Backends try the bare name and then each suffix in order; the
//! first hit wins.

use std::ffi::{CStr, CString};
use std::mem;
use std::os::raw::c_void;
use std::ptr;
use std::sync::OnceLock;

/// Suffix order for OpenGL ES drivers (EGL, ANGLE, Emscripten).
pub(crate) const GLES_SUFFIXES: &[&str] = &["", "OES", "APPLE", "ARB", "EXT", "KHR", "NV"];

/// Suffix order for desktop OpenGL drivers (GLX, WGL, OSMesa).
#[allow(dead_code)]
pub(crate) const DESKTOP_SUFFIXES: &[&str] = &["", "ARB", "EXT", "KHR", "NV"];

/// Suffix order for Apple's OpenGL framework.
#[allow(dead_code)]
pub(crate) const APPLE_SUFFIXES: &[&str] = &["", "APPLE", "ARB", "EXT", "KHR", "NV"];

/// Calls `lookup` with `name` plus each suffix in turn and returns the first non-null result.
pub(crate) fn with_suffixes<F>(name: &str, suffixes: &[&str], mut lookup: F) -> *const c_void
                                where F: FnMut(&CStr) -> *const c_void {
    for suffix in suffixes {
        let full_name = match CString::new(format!("{}{}", name, suffix)) {
            Ok(full_name) => full_name,
            Err(_) => return ptr::null(),
        };
        let function = lookup(&full_name);
        if !function.is_null() {
            return function;
        }
    }
    ptr::null()
}

type ClearDepth = unsafe extern "system" fn(depth: f64);
type DepthRange = unsafe extern "system" fn(near: f64, far: f64);

static CLEAR_DEPTH: OnceLock<Option<ClearDepth>> = OnceLock::new();
static DEPTH_RANGE: OnceLock<Option<DepthRange>> = OnceLock::new();

/// Stands in for `glClearDepthf` and `glDepthRangef`, which desktop GL only has since 4.1, on top
/// of their double-precision versions. `lookup` resolves the double-precision function.
///
/// Returns null for any other name, or if the double-precision function is unavailable too.
#[cfg_attr(not(any(glx, wgl, macos, osmesa, test)), allow(dead_code))]
pub(crate) fn float_depth_fallback<F>(name: &str, mut lookup: F) -> *const c_void
                                      where F: FnMut(&str) -> *const c_void {
    match name {
        "glClearDepthf" => {
            let clear_depth = CLEAR_DEPTH.get_or_init(|| unsafe {
                to_function::<ClearDepth>(lookup("glClearDepth"))
            });
            match *clear_depth {
                Some(_) => clear_depthf as *const c_void,
                None => ptr::null(),
            }
        }
        "glDepthRangef" => {
            let depth_range = DEPTH_RANGE.get_or_init(|| unsafe {
                to_function::<DepthRange>(lookup("glDepthRange"))
            });
            match *depth_range {
                Some(_) => depth_rangef as *const c_void,
                None => ptr::null(),
            }
        }
        _ => ptr::null(),
    }
}

unsafe fn to_function<F>(function: *const c_void) -> Option<F> where F: Copy {
    if function.is_null() {
        None
    } else {
        Some(mem::transmute_copy(&function))
    }
}

extern "system" fn clear_depthf(depth: f32) {
    if let Some(Some(clear_depth)) = CLEAR_DEPTH.get() {
        unsafe { clear_depth(depth as f64) }
    }
}

extern "system" fn depth_rangef(near: f32, far: f32) {
    if let Some(Some(depth_range)) = DEPTH_RANGE.get() {
        unsafe { depth_range(near as f64, far as f64) }
    }
}

#[cfg(test)]
mod tests {
    use super::{float_depth_fallback, with_suffixes, DESKTOP_SUFFIXES, GLES_SUFFIXES};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::os::raw::c_void;

    fn table_lookup<'a>(names: &'a [&'a str], tried: &'a mut Vec<String>)
                        -> impl FnMut(&std::ffi::CStr) -> *const c_void + 'a {
        move |name| {
            let name = name.to_str().unwrap().to_owned();
            let found = names.iter().position(|candidate| *candidate == name);
            tried.push(name);
            match found {
                Some(index) => (index + 1) as *const c_void,
                None => std::ptr::null(),
            }
        }
    }

    #[test]
    fn test_bare_name_wins() {
        let mut tried = vec![];
        let names = ["glBindVertexArray", "glBindVertexArrayOES"];
        let function = with_suffixes("glBindVertexArray",
                                     GLES_SUFFIXES,
                                     table_lookup(&names, &mut tried));
        assert_eq!(function as usize, 1);
        assert_eq!(tried, vec!["glBindVertexArray"]);
    }

    #[test]
    fn test_suffixes_tried_in_order() {
        let mut tried = vec![];
        let names = ["glBindVertexArrayEXT", "glBindVertexArrayAPPLE"];
        let function = with_suffixes("glBindVertexArray",
                                     GLES_SUFFIXES,
                                     table_lookup(&names, &mut tried));
        assert_eq!(function as usize, 2);
        assert_eq!(tried, vec!["glBindVertexArray", "glBindVertexArrayOES", "glBindVertexArrayAPPLE"]);
    }

    #[test]
    fn test_desktop_order_skips_gles_suffixes() {
        let mut tried = vec![];
        let names = ["glDrawBuffersOES"];
        let function = with_suffixes("glDrawBuffers",
                                     DESKTOP_SUFFIXES,
                                     table_lookup(&names, &mut tried));
        assert!(function.is_null());
        assert_eq!(tried.len(), DESKTOP_SUFFIXES.len());
        assert!(!tried.iter().any(|name| name.ends_with("OES")));
    }

    #[test]
    fn test_interior_nul_is_unresolved() {
        let mut tried = vec![];
        let function = with_suffixes("glClear\0junk", GLES_SUFFIXES, table_lookup(&[], &mut tried));
        assert!(function.is_null());
        assert!(tried.is_empty());
    }

    static CLEARED_DEPTH: AtomicU64 = AtomicU64::new(0);
    static DEPTH_RANGE_FAR: AtomicU64 = AtomicU64::new(0);

    extern "system" fn clear_depth(depth: f64) {
        CLEARED_DEPTH.store(depth.to_bits(), Ordering::SeqCst);
    }

    extern "system" fn depth_range(_near: f64, far: f64) {
        DEPTH_RANGE_FAR.store(far.to_bits(), Ordering::SeqCst);
    }

    #[test]
    fn test_float_depth_fallback() {
        let lookup = |name: &str| match name {
            "glClearDepth" => clear_depth as *const c_void,
            "glDepthRange" => depth_range as *const c_void,
            _ => std::ptr::null(),
        };
        assert!(float_depth_fallback("glClear", lookup).is_null());

        let clear_depthf = float_depth_fallback("glClearDepthf", lookup);
        assert!(!clear_depthf.is_null());
        let depth_rangef = float_depth_fallback("glDepthRangef", lookup);
        assert!(!depth_rangef.is_null());
        unsafe {
            let clear_depthf: extern "system" fn(f32) = std::mem::transmute(clear_depthf);
            let depth_rangef: extern "system" fn(f32, f32) = std::mem::transmute(depth_rangef);
            clear_depthf(0.5);
            depth_rangef(0.25, 0.75);
        }
        assert_eq!(f64::from_bits(CLEARED_DEPTH.load(Ordering::SeqCst)), 0.5);
        assert_eq!(f64::from_bits(DEPTH_RANGE_FAR.load(Ordering::SeqCst)), 0.75);
    }
}
