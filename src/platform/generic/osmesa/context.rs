// portgfx/src/platform/generic/osmesa/context.rs
//
//! Wrapper for OSMesa contexts.

use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::proc_address::{self, DESKTOP_SUFFIXES};
use crate::{Error, WindowingApiError};

use osmesa_sys::{OSMesaContext, OSMesaCreateContextExt, OSMesaDestroyContext};
use osmesa_sys::{OSMesaGetColorBuffer, OSMesaGetCurrentContext, OSMesaGetProcAddress};
use osmesa_sys::OSMesaMakeCurrent;
use std::cell::UnsafeCell;
use std::os::raw::{c_int, c_uint, c_void};
use std::ptr;

const OSMESA_RGBA: c_uint = 0x1908;
const GL_UNSIGNED_BYTE: c_uint = 0x1401;

const BYTES_PER_PIXEL: usize = 4;

/// An OSMesa context and the client memory it renders into.
pub struct OsMesaContext {
    osmesa_context: OSMesaContext,
    // Owned contexts render into `pixels`; wrapped ones into whatever buffer was bound.
    pixels: UnsafeCell<Vec<u8>>,
    buffer: *mut c_void,
    width: c_int,
    height: c_int,
    is_owned: bool,
}

// The pixel buffer is only written by OSMesa while the context is current, and binding is
// serialized by the caller.
unsafe impl Send for OsMesaContext {}
unsafe impl Sync for OsMesaContext {}

/// The OSMesa backend.
pub struct OsMesaBackend;

impl OsMesaContext {
    fn new(spec: &GlContextSpec, share_with: Option<&OsMesaContext>)
           -> Result<OsMesaContext, Error> {
        if spec.width() <= 0 || spec.height() <= 0 {
            return Err(Error::InvalidBackbufferSize { width: spec.width(), height: spec.height() });
        }
        if spec.native_window.is_some() {
            return Err(Error::IncompatibleNativeWindow);
        }
        spec.warn_if_debug_unsupported("OSMesa");

        let share_context = share_with.map_or(ptr::null_mut(), |other| other.osmesa_context);
        unsafe {
            let osmesa_context = OSMesaCreateContextExt(OSMESA_RGBA,
                                                        spec.depthbuffer_bit_depth,
                                                        0,
                                                        0,
                                                        share_context);
            if osmesa_context.is_null() {
                return Err(Error::ContextCreationFailed(WindowingApiError::Failed));
            }

            let length = BYTES_PER_PIXEL * spec.width() as usize * spec.height() as usize;
            let mut context = OsMesaContext {
                osmesa_context,
                pixels: UnsafeCell::new(vec![0; length]),
                buffer: ptr::null_mut(),
                width: spec.width(),
                height: spec.height(),
                is_owned: true,
            };
            context.buffer = context.pixels.get_mut().as_mut_ptr() as *mut c_void;
            Ok(context)
        }
    }

    fn wrapping() -> Result<OsMesaContext, Error> {
        unsafe {
            let osmesa_context = OSMesaGetCurrentContext();
            if osmesa_context.is_null() {
                return Err(Error::NoCurrentContext);
            }
            let (mut width, mut height, mut format, mut buffer) = (0, 0, 0, ptr::null_mut());
            OSMesaGetColorBuffer(osmesa_context, &mut width, &mut height, &mut format, &mut buffer);
            Ok(OsMesaContext {
                osmesa_context,
                pixels: UnsafeCell::new(vec![]),
                buffer,
                width,
                height,
                is_owned: false,
            })
        }
    }
}

impl NativeContext for OsMesaContext {
    #[inline]
    fn is_valid(&self) -> bool {
        !self.osmesa_context.is_null()
    }

    #[inline]
    fn is_owned(&self) -> bool {
        self.is_owned
    }

    #[inline]
    fn native_handle(&self) -> usize {
        self.osmesa_context as usize
    }

    fn get_proc_address(&self, name: &str, _: ProcAddressFlags) -> *const c_void {
        let function = get_proc_address(name);
        if !function.is_null() {
            return function;
        }
        proc_address::float_depth_fallback(name, get_proc_address)
    }

    // Rendering goes straight to client memory.
    fn swap_buffers(&self) {}

    fn make_current(&self) -> bool {
        unsafe {
            OSMesaMakeCurrent(self.osmesa_context,
                              self.buffer,
                              GL_UNSIGNED_BYTE,
                              self.width,
                              self.height) != 0
        }
    }

    fn clear_current(&self) {
        unsafe {
            OSMesaMakeCurrent(ptr::null_mut(), ptr::null_mut(), 0, 0, 0);
        }
    }

    fn set_swap_interval(&self, _: i32) -> bool {
        true
    }

    fn create_in_share_group(&self, spec: &GlContextSpec)
                             -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(OsMesaContext::new(spec, Some(self))?))
    }
}

impl Drop for OsMesaContext {
    fn drop(&mut self) {
        if self.is_owned && !self.osmesa_context.is_null() {
            unsafe {
                if OSMesaGetCurrentContext() == self.osmesa_context {
                    OSMesaMakeCurrent(ptr::null_mut(), ptr::null_mut(), 0, 0, 0);
                }
                OSMesaDestroyContext(self.osmesa_context);
            }
            self.osmesa_context = ptr::null_mut();
        }
    }
}

impl Backend for OsMesaBackend {
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(OsMesaContext::new(spec, None)?))
    }

    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(OsMesaContext::wrapping()?))
    }

    fn current_context_id() -> usize {
        unsafe { OSMesaGetCurrentContext() as usize }
    }
}

fn get_proc_address(name: &str) -> *const c_void {
    proc_address::with_suffixes(name, DESKTOP_SUFFIXES, |full_name| unsafe {
        match OSMesaGetProcAddress(full_name.as_ptr()) {
            Some(function) => function as *const c_void,
            None => ptr::null(),
        }
    })
}
