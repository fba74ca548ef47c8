// portgfx/src/platform/macos/cgl/context.rs
//
//! Wrapper for Core OpenGL contexts.

use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::library::Library;
use crate::proc_address::{self, APPLE_SUFFIXES};
use crate::Error;
use super::error::ToWindowingApiError;

use cgl::{kCGLCPSwapInterval, kCGLPFAAccelerated, kCGLPFADepthSize, CGLChoosePixelFormat};
use cgl::{CGLContextObj, CGLCreateContext, CGLDestroyContext, CGLError, CGLFlushDrawable};
use cgl::{CGLGetCurrentContext, CGLPixelFormatAttribute, CGLReleasePixelFormat};
use cgl::{CGLSetCurrentContext, CGLSetParameter};
use std::os::raw::c_void;
use std::ptr;

// No CGL error occurred.
#[allow(non_upper_case_globals)]
const kCGLNoError: CGLError = 0;

static OPENGL_FRAMEWORK_PATH: &str = "/System/Library/Frameworks/OpenGL.framework/OpenGL";

lazy_static! {
    static ref OPENGL_FRAMEWORK: Option<Library> = Library::open(&[OPENGL_FRAMEWORK_PATH]);
}

/// A CGL context. Owned contexts have no drawable; they render to framebuffer objects.
pub struct CglContext {
    cgl_context: CGLContextObj,
    is_owned: bool,
}

// CGL contexts may be made current on any thread.
unsafe impl Send for CglContext {}
unsafe impl Sync for CglContext {}

/// The CGL backend.
pub struct CglBackend;

impl CglContext {
    fn new(spec: &GlContextSpec, share_with: Option<&CglContext>) -> Result<CglContext, Error> {
        if spec.native_window.is_some() {
            return Err(Error::IncompatibleNativeWindow);
        }
        spec.warn_if_debug_unsupported("CGL");

        let attributes: [CGLPixelFormatAttribute; 4] = [
            kCGLPFAAccelerated,
            kCGLPFADepthSize, spec.depthbuffer_bit_depth as CGLPixelFormatAttribute,
            0,
        ];

        unsafe {
            let (mut cgl_pixel_format, mut cgl_pixel_format_count) = (ptr::null_mut(), 0);
            let err = CGLChoosePixelFormat(attributes.as_ptr(),
                                           &mut cgl_pixel_format,
                                           &mut cgl_pixel_format_count);
            if err != kCGLNoError {
                return Err(Error::PixelFormatSelectionFailed(err.to_windowing_api_error()));
            }
            if cgl_pixel_format.is_null() || cgl_pixel_format_count == 0 {
                return Err(Error::NoPixelFormatFound);
            }

            let mut cgl_context = ptr::null_mut();
            let err = CGLCreateContext(cgl_pixel_format,
                                       share_with.map_or(ptr::null_mut(), |other| other.cgl_context),
                                       &mut cgl_context);
            CGLReleasePixelFormat(cgl_pixel_format);
            if err != kCGLNoError {
                return Err(Error::ContextCreationFailed(err.to_windowing_api_error()));
            }
            debug_assert!(!cgl_context.is_null());

            Ok(CglContext { cgl_context, is_owned: true })
        }
    }

    fn wrapping() -> Result<CglContext, Error> {
        unsafe {
            let cgl_context = CGLGetCurrentContext();
            if cgl_context.is_null() {
                return Err(Error::NoCurrentContext);
            }
            Ok(CglContext { cgl_context, is_owned: false })
        }
    }
}

impl NativeContext for CglContext {
    #[inline]
    fn is_valid(&self) -> bool {
        !self.cgl_context.is_null()
    }

    #[inline]
    fn is_owned(&self) -> bool {
        self.is_owned
    }

    #[inline]
    fn native_handle(&self) -> usize {
        self.cgl_context as usize
    }

    fn get_proc_address(&self, name: &str, _: ProcAddressFlags) -> *const c_void {
        let framework = match *OPENGL_FRAMEWORK {
            Some(ref framework) => framework,
            None => return ptr::null(),
        };
        let lookup = |name: &str| {
            proc_address::with_suffixes(name, APPLE_SUFFIXES, |full_name| {
                framework.symbol(full_name)
            })
        };
        let function = lookup(name);
        if !function.is_null() {
            return function;
        }
        proc_address::float_depth_fallback(name, lookup)
    }

    fn swap_buffers(&self) {
        unsafe {
            CGLFlushDrawable(self.cgl_context);
        }
    }

    fn make_current(&self) -> bool {
        unsafe { CGLSetCurrentContext(self.cgl_context) == kCGLNoError }
    }

    fn clear_current(&self) {
        unsafe {
            CGLSetCurrentContext(ptr::null_mut());
        }
    }

    fn set_swap_interval(&self, interval: i32) -> bool {
        unsafe {
            let cgl_context = CGLGetCurrentContext();
            !cgl_context.is_null() &&
                CGLSetParameter(cgl_context, kCGLCPSwapInterval, &interval) == kCGLNoError
        }
    }

    fn create_in_share_group(&self, spec: &GlContextSpec)
                             -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(CglContext::new(spec, Some(self))?))
    }
}

impl Drop for CglContext {
    fn drop(&mut self) {
        if !self.is_owned || self.cgl_context.is_null() {
            return;
        }
        unsafe {
            if CGLGetCurrentContext() == self.cgl_context {
                CGLSetCurrentContext(ptr::null_mut());
            }
            CGLDestroyContext(self.cgl_context);
        }
        self.cgl_context = ptr::null_mut();
    }
}

impl Backend for CglBackend {
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(CglContext::new(spec, None)?))
    }

    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(CglContext::wrapping()?))
    }

    fn current_context_id() -> usize {
        unsafe { CGLGetCurrentContext() as usize }
    }
}
