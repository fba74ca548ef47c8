// portgfx/src/platform/egl/context.rs
//
//! Contexts on the system EGL implementation.

use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::library::Library;
use crate::platform::generic::egl::context::{self, EglContext, EglPlatform};
use crate::proc_address::{self, GLES_SUFFIXES};
use crate::Error;

use std::ffi::CStr;
use std::os::raw::c_void;
use std::ptr;
use std::sync::Once;

#[cfg(target_os = "android")]
const EGL_CONFIG_PATH: &str = "/system/lib/egl/egl.cfg";

// Android's EGL loader turns the EXT_debug_marker functions into no-ops, so these are always
// taken from the vendor library.
#[cfg(target_os = "android")]
static VENDOR_ONLY_FUNCTIONS: &[&str] = &[
    "glInsertEventMarker",
    "glPushGroupMarker",
    "glPopGroupMarker",
];
#[cfg(not(target_os = "android"))]
static VENDOR_ONLY_FUNCTIONS: &[&str] = &[];

lazy_static! {
    static ref GLES_LIBRARY: Option<Library> = open_gles_library();
    static ref PROCESS_IMAGE: Option<Library> = Library::process();
}

static NON_PURE_WARNING: Once = Once::new();

/// An EGL context on Android or on Linux with OpenGL ES.
pub(crate) type SystemEglContext = EglContext<SystemEgl>;

/// The EGL backend.
pub struct EglBackend;

/// The hooks of the system EGL implementation. There is no per-context state.
pub(crate) struct SystemEgl;

impl EglPlatform for SystemEgl {
    #[inline]
    fn prepare(_: &GlContextSpec) -> Result<SystemEgl, Error> {
        Ok(SystemEgl)
    }

    #[inline]
    fn wrapping() -> SystemEgl {
        SystemEgl
    }

    fn get_proc_address(name: &str, flags: ProcAddressFlags) -> *const c_void {
        let is_core = flags.contains(ProcAddressFlags::CORE);
        let is_pure = flags.contains(ProcAddressFlags::PURE);

        let force_library = VENDOR_ONLY_FUNCTIONS.contains(&name);
        if force_library {
            info!("Forcing non-pure loading of {}.", name);
        }
        if cfg!(target_os = "android") && !is_pure {
            NON_PURE_WARNING.call_once(|| {
                warn!("Non-pure loading is deprecated on Android. To enable pure loading, pass \
                       ProcAddressFlags::PURE to get_proc_address. {}", name);
            });
        }

        proc_address::with_suffixes(name, GLES_SUFFIXES, |full_name| {
            if !is_pure || force_library {
                // Drivers may return wrappers for unimplemented functions from
                // `eglGetProcAddress`, so only trust it for names the vendor library exports.
                let library_function = match *GLES_LIBRARY {
                    Some(ref library) => library.symbol(full_name),
                    None => ptr::null(),
                };
                if !library_function.is_null() {
                    if is_core {
                        return library_function;
                    }
                } else if !full_name.to_bytes().starts_with(b"egl") {
                    return ptr::null();
                }
            }

            let function = context::egl_get_proc_address(full_name);
            if function.is_null() && is_pure && is_core {
                // EGL before 1.5 only resolves extension functions.
                return lookup_in_process(full_name);
            }
            function
        })
    }
}

impl Backend for EglBackend {
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(SystemEglContext::new(spec, None)?))
    }

    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(SystemEglContext::wrapping()?))
    }

    #[inline]
    fn current_context_id() -> usize {
        context::current_context_id::<SystemEgl>()
    }
}

fn lookup_in_process(name: &CStr) -> *const c_void {
    match *PROCESS_IMAGE {
        Some(ref process) => process.symbol(name),
        None => ptr::null(),
    }
}

#[cfg(target_os = "android")]
fn open_gles_library() -> Option<Library> {
    let vendor_library = std::fs::read_to_string(EGL_CONFIG_PATH)
        .ok()
        .and_then(|config| vendor_library_name(&config))
        .and_then(|name| Library::open(&[&name]));
    if vendor_library.is_some() {
        return vendor_library;
    }
    let library = Library::open(&["libGLESv2_android.so", "libGLESv2.so"]);
    if library.is_none() {
        error!("Unable to open graphics libraries.");
    }
    library
}

#[cfg(not(target_os = "android"))]
fn open_gles_library() -> Option<Library> {
    let library = Library::open(&["libGLESv2.so.2", "libGLESv2.so"]);
    if library.is_none() {
        error!("Unable to open graphics libraries.");
    }
    library
}

/// Picks the vendor's GLES library out of an `egl.cfg` file.
///
/// Each line reads `<display> <implementation> <tag>`; the first tag other than `android` names
/// `libGLESv2_<tag>.so`.
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
fn vendor_library_name(config: &str) -> Option<String> {
    config.lines().filter_map(|line| {
        let mut fields = line.split_whitespace();
        // Display and implementation indices.
        fields.next()?.parse::<i32>().ok()?;
        fields.next()?.parse::<i32>().ok()?;
        fields.next()
    }).find(|&tag| tag != "android").map(|tag| format!("libGLESv2_{}.so", tag))
}

#[cfg(test)]
mod tests {
    use super::vendor_library_name;

    #[test]
    fn test_vendor_library_name() {
        let config = "0 0 android\n0 1 adreno\n0 1 mali\n";
        assert_eq!(vendor_library_name(config), Some("libGLESv2_adreno.so".to_owned()));
    }

    #[test]
    fn test_vendor_library_name_skips_malformed_lines() {
        assert_eq!(vendor_library_name("# comment\n0 0 android\n"), None);
        assert_eq!(vendor_library_name("x 1 tegra\n0 1\n0 1 tegra"),
                   Some("libGLESv2_tegra.so".to_owned()));
        assert_eq!(vendor_library_name(""), None);
    }
}
