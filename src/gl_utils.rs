// portgfx/src/gl_utils.rs
//
//! Extension queries and swap interval control for the current context.

use crate::{GlContext, ProcAddressFlags};

use std::ffi::CStr;
use std::mem;
use std::os::raw::{c_char, c_uchar, c_uint};

const GL_EXTENSIONS: c_uint = 0x1f03;

/// Whether `extensions`, a space-separated extension list, contains `unprefixed_extension` under
/// any API or vendor prefix.
///
/// The prefix must consist of uppercase letters and underscores only, so `vertex_array_object`
/// matches `GL_OES_vertex_array_object` but not `GL_OES_big_vertex_array_object`.
pub fn is_extension_supported(unprefixed_extension: &str, extensions: &str) -> bool {
    if unprefixed_extension.is_empty() {
        return false;
    }
    extensions.split(' ').any(|extension| {
        extension.strip_suffix(unprefixed_extension).map_or(false, |prefix| {
            prefix.bytes().all(|byte| byte.is_ascii_uppercase() || byte == b'_')
        })
    })
}

/// Like [`is_extension_supported`], using the extension string of the current context.
///
/// Returns false when no context is current, which is most likely a bug in the caller and is
/// logged as such.
pub fn is_extension_supported_in_current_context(unprefixed_extension: &str) -> bool {
    let context = match GlContext::get_current(false) {
        Some(context) => context,
        None => {
            warn!("is_extension_supported({}) returning false because there is no OpenGL context.",
                  unprefixed_extension);
            return false;
        }
    };

    let get_string = context.get_proc_address("glGetString",
                                              ProcAddressFlags::CORE | ProcAddressFlags::PURE);
    if get_string.is_null() {
        error!("is_extension_supported({}) failed to retrieve the extensions string.",
               unprefixed_extension);
        return false;
    }

    unsafe {
        let get_string: unsafe extern "system" fn(c_uint) -> *const c_uchar =
            mem::transmute(get_string);
        let extensions = get_string(GL_EXTENSIONS);
        if extensions.is_null() {
            return false;
        }
        let extensions = CStr::from_ptr(extensions as *const c_char).to_string_lossy();
        is_extension_supported(unprefixed_extension, &extensions)
    }
}

/// Sets the swap interval of the current context: 0 disables vsync, 1 enables it, larger values
/// wait for more vertical blanks.
///
/// Returns false if no context is current, `interval` is negative, or the backend refused. Some
/// backends (Android, Emscripten, OSMesa) report success without doing anything.
pub fn set_swap_interval(interval: i32) -> bool {
    let context = match GlContext::get_current(false) {
        Some(context) => context,
        None => return false,
    };
    if interval < 0 {
        return false;
    }
    context.native().set_swap_interval(interval)
}
