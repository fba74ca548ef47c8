// portgfx/src/platform/unix/glx/ffi.rs
//
//! X11 and GLX entry points, resolved at run time.
//!
//! Binaries must load and run on machines without X11 (headless test runners, for example). Such
//! machines fail context creation with an error naming the missing entry points instead of failing
//! to link.

use crate::library::Library;
use crate::Error;

use std::ffi::CStr;
use std::mem;
use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_ulong, c_void};
use std::ptr;
use x11_dl::glx::{GLXContext, GLXDrawable, GLXFBConfig};
use x11_dl::xlib::{Colormap, Display, Visual, Window, XSetWindowAttributes, XVisualInfo};

pub(crate) const GLX_CONTEXT_FLAGS_ARB: c_int = 0x2094;
pub(crate) const GLX_CONTEXT_DEBUG_BIT_ARB: c_int = 0x0001;

pub(crate) type GlxCreateContextAttribsArb = unsafe extern "C" fn(display: *mut Display,
                                                                  config: GLXFBConfig,
                                                                  share_context: GLXContext,
                                                                  direct: c_int,
                                                                  attributes: *const c_int)
                                                                  -> GLXContext;
pub(crate) type GlxSwapIntervalSgi = unsafe extern "C" fn(interval: c_int) -> c_int;

static LIBRARY_NAMES: &[&[&str]] = &[
    &["libX11.so.6", "libX11.so"],
    &["libGL.so.1", "libGL.so"],
];

lazy_static! {
    static ref LIBRARIES: Vec<Library> = {
        let mut libraries: Vec<Library> = Library::process().into_iter().collect();
        libraries.extend(LIBRARY_NAMES.iter().filter_map(|names| Library::open(names)));
        libraries
    };
    static ref ENTRY_POINTS: Result<EntryPoints, Vec<&'static str>> = EntryPoints::load();
}

macro_rules! entry_points {
    ($($name:ident: $signature:ty,)*) => {
        #[allow(non_snake_case)]
        pub(crate) struct EntryPoints {
            $(pub(crate) $name: $signature,)*
        }

        impl EntryPoints {
            fn load() -> Result<EntryPoints, Vec<&'static str>> {
                EntryPoints::load_with(lookup)
            }

            /// Resolves every entry point with `lookup`, which receives NUL-terminated names.
            ///
            /// On failure, returns the names of all unresolved entry points in declaration order.
            #[allow(non_snake_case)]
            fn load_with<F>(mut lookup: F) -> Result<EntryPoints, Vec<&'static str>>
                            where F: FnMut(&'static str) -> *const c_void {
                let mut missing = vec![];
                $(
                    let $name = lookup(concat!(stringify!($name), "\0"));
                    if $name.is_null() {
                        missing.push(stringify!($name));
                    }
                )*
                if !missing.is_empty() {
                    error!("missing X11/GLX entry points: {}", missing.join(", "));
                    return Err(missing);
                }
                unsafe {
                    Ok(EntryPoints {
                        $($name: mem::transmute::<*const c_void, $signature>($name),)*
                    })
                }
            }
        }
    }
}

entry_points! {
    XCloseDisplay: unsafe extern "C" fn(*mut Display) -> c_int,
    XCreateColormap: unsafe extern "C" fn(*mut Display, Window, *mut Visual, c_int) -> Colormap,
    XCreateWindow: unsafe extern "C" fn(*mut Display,
                                        Window,
                                        c_int,
                                        c_int,
                                        c_uint,
                                        c_uint,
                                        c_uint,
                                        c_int,
                                        c_uint,
                                        *mut Visual,
                                        c_ulong,
                                        *mut XSetWindowAttributes)
                                        -> Window,
    XDestroyWindow: unsafe extern "C" fn(*mut Display, Window) -> c_int,
    XFree: unsafe extern "C" fn(*mut c_void) -> c_int,
    XFreeColormap: unsafe extern "C" fn(*mut Display, Colormap) -> c_int,
    XOpenDisplay: unsafe extern "C" fn(*const c_char) -> *mut Display,
    XRootWindow: unsafe extern "C" fn(*mut Display, c_int) -> Window,
    glXChooseFBConfig: unsafe extern "C" fn(*mut Display, c_int, *const c_int, *mut c_int)
                                            -> *mut GLXFBConfig,
    glXChooseVisual: unsafe extern "C" fn(*mut Display, c_int, *mut c_int) -> *mut XVisualInfo,
    glXCreateContext: unsafe extern "C" fn(*mut Display, *mut XVisualInfo, GLXContext, c_int)
                                           -> GLXContext,
    glXDestroyContext: unsafe extern "C" fn(*mut Display, GLXContext),
    glXGetCurrentContext: unsafe extern "C" fn() -> GLXContext,
    glXGetCurrentDisplay: unsafe extern "C" fn() -> *mut Display,
    glXGetCurrentDrawable: unsafe extern "C" fn() -> GLXDrawable,
    glXGetProcAddressARB: unsafe extern "C" fn(*const c_uchar) -> *const c_void,
    glXMakeCurrent: unsafe extern "C" fn(*mut Display, GLXDrawable, GLXContext) -> c_int,
    glXQueryExtension: unsafe extern "C" fn(*mut Display, *mut c_int, *mut c_int) -> c_int,
    glXSwapBuffers: unsafe extern "C" fn(*mut Display, GLXDrawable),
}

/// The loaded entry points, or an error naming every one that is missing.
pub(crate) fn entry_points() -> Result<&'static EntryPoints, Error> {
    match *ENTRY_POINTS {
        Ok(ref entry_points) => Ok(entry_points),
        Err(ref missing) => Err(Error::MissingEntryPoints(missing.clone())),
    }
}

fn lookup(name: &'static str) -> *const c_void {
    let name = match CStr::from_bytes_with_nul(name.as_bytes()) {
        Ok(name) => name,
        Err(_) => return ptr::null(),
    };
    LIBRARIES.iter()
             .map(|library| library.symbol(name))
             .find(|function| !function.is_null())
             .unwrap_or(ptr::null())
}

#[cfg(test)]
mod tests {
    use super::EntryPoints;
    use crate::tests::log_checker::LogChecker;

    use log::Level;
    use std::os::raw::c_void;
    use std::ptr;

    fn fake_function() {}

    #[test]
    fn test_all_entry_points_resolved() {
        let mut requested = vec![];
        let entry_points = EntryPoints::load_with(|name| {
            assert!(name.ends_with('\0'));
            requested.push(name.trim_end_matches('\0'));
            fake_function as *const c_void
        });
        assert!(entry_points.is_ok());
        assert_eq!(requested.first(), Some(&"XCloseDisplay"));
        assert_eq!(requested.last(), Some(&"glXSwapBuffers"));
        assert_eq!(requested.len(), 19);
    }

    #[test]
    fn test_every_missing_entry_point_reported() {
        let log_checker = LogChecker::new();
        let result = EntryPoints::load_with(|name| {
            match name.trim_end_matches('\0') {
                "XFree" | "glXChooseFBConfig" | "glXSwapBuffers" => ptr::null(),
                _ => fake_function as *const c_void,
            }
        });
        let missing = match result {
            Ok(_) => panic!("entry points loaded with functions missing"),
            Err(missing) => missing,
        };
        assert_eq!(missing, vec!["XFree", "glXChooseFBConfig", "glXSwapBuffers"]);
        assert!(log_checker.has_message(Level::Error,
                                        "missing X11/GLX entry points: XFree, glXChooseFBConfig, \
                                         glXSwapBuffers"));
    }

    #[test]
    fn test_no_library() {
        let log_checker = LogChecker::new();
        assert_eq!(EntryPoints::load_with(|_| ptr::null()).err().map(|missing| missing.len()),
                   Some(19));
        assert!(log_checker.has_message(Level::Error, "XCloseDisplay, XCreateColormap"));
    }
}
