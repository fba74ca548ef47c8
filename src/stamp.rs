//! A GPU-resident marker identifying which `GlContext` a native context belongs to.
//!
//! Drivers may hand out the same handle value for a new context after an old one is destroyed.
//! The stamp is a fragment shader object whose source names the owning `GlContext`; reading it
//! back from the current native context tells whether the handle still refers to the same
//! context.

use crate::context::{NativeContext, ProcAddressFlags};

use std::ffi::CString;
use std::mem;
use std::os::raw::{c_char, c_int, c_uchar, c_uint};
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::OnceLock;

const GL_FRAGMENT_SHADER: c_uint = 0x8b30;
const GL_FALSE: c_uchar = 0;

const SOURCE_BUFFER_LENGTH: usize = 64;

static WARNED_UNAVAILABLE: AtomicBool = AtomicBool::new(false);

#[allow(non_snake_case)]
#[derive(Clone, Copy)]
struct StampFunctions {
    CreateShader: unsafe extern "system" fn(kind: c_uint) -> c_uint,
    ShaderSource: unsafe extern "system" fn(shader: c_uint,
                                            count: c_int,
                                            strings: *const *const c_char,
                                            lengths: *const c_int),
    IsShader: unsafe extern "system" fn(shader: c_uint) -> c_uchar,
    GetShaderSource: unsafe extern "system" fn(shader: c_uint,
                                               buffer_size: c_int,
                                               length: *mut c_int,
                                               source: *mut c_char),
}

pub(crate) struct Stamp {
    shader: AtomicU32,
    functions: OnceLock<Option<StampFunctions>>,
}

impl Stamp {
    pub(crate) fn new() -> Stamp {
        Stamp { shader: AtomicU32::new(0), functions: OnceLock::new() }
    }

    #[inline]
    pub(crate) fn shader(&self) -> u32 {
        self.shader.load(Ordering::Acquire)
    }

    /// Creates the marker unless one exists. `native` must be current on the calling thread.
    pub(crate) fn maybe_create(&self, native: &dyn NativeContext, payload: &str) {
        if self.shader() != 0 {
            return;
        }
        let functions = match self.functions(native) {
            Some(functions) => functions,
            None => return,
        };
        let source = match CString::new(payload) {
            Ok(source) => source,
            Err(_) => return,
        };

        unsafe {
            let shader = (functions.CreateShader)(GL_FRAGMENT_SHADER);
            if shader == 0 {
                return;
            }
            let strings = [source.as_ptr()];
            (functions.ShaderSource)(shader, 1, strings.as_ptr(), ptr::null());
            self.shader.store(shader, Ordering::Release);
        }
    }

    /// Whether the native context current on this thread carries this marker.
    ///
    /// A context that was never stamped always passes.
    pub(crate) fn check(&self, native: &dyn NativeContext, payload: &str) -> bool {
        let shader = self.shader();
        if shader == 0 {
            return true;
        }
        let functions = match self.functions(native) {
            Some(functions) => functions,
            None => return true,
        };

        let mut buffer = [0 as c_char; SOURCE_BUFFER_LENGTH];
        let mut length = 0;
        unsafe {
            if (functions.IsShader)(shader) == GL_FALSE {
                return false;
            }
            (functions.GetShaderSource)(shader,
                                        SOURCE_BUFFER_LENGTH as c_int,
                                        &mut length,
                                        buffer.as_mut_ptr());
        }
        let length = (length.max(0) as usize).min(SOURCE_BUFFER_LENGTH);
        let source: Vec<u8> = buffer[..length].iter().map(|&byte| byte as u8).collect();
        source == payload.as_bytes()
    }

    fn functions(&self, native: &dyn NativeContext) -> Option<StampFunctions> {
        *self.functions.get_or_init(|| {
            let functions = load_functions(native);
            if functions.is_none() && !WARNED_UNAVAILABLE.swap(true, Ordering::Relaxed) {
                warn!("GL shader functions not found; GlContext stamps are disabled.");
            }
            functions
        })
    }
}

fn load_functions(native: &dyn NativeContext) -> Option<StampFunctions> {
    let flags = ProcAddressFlags::CORE | ProcAddressFlags::PURE;
    let create_shader = native.get_proc_address("glCreateShader", flags);
    let shader_source = native.get_proc_address("glShaderSource", flags);
    let is_shader = native.get_proc_address("glIsShader", flags);
    let get_shader_source = native.get_proc_address("glGetShaderSource", flags);
    if create_shader.is_null() ||
            shader_source.is_null() ||
            is_shader.is_null() ||
            get_shader_source.is_null() {
        return None;
    }

    unsafe {
        Some(StampFunctions {
            CreateShader: mem::transmute(create_shader),
            ShaderSource: mem::transmute(shader_source),
            IsShader: mem::transmute(is_shader),
            GetShaderSource: mem::transmute(get_shader_source),
        })
    }
}
