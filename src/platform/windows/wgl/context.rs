// portgfx/src/platform/windows/wgl/context.rs
//
//! Wrapper for WGL contexts on Windows.

use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::library::Library;
use crate::proc_address::{self, DESKTOP_SUFFIXES};
use crate::{Error, WindowingApiError};
use super::super::window::Win32Window;

use std::mem;
use std::os::raw::{c_int, c_void};
use std::ptr;
use winapi::shared::minwindef::{BOOL, FALSE};
use winapi::shared::ntdef::LPCSTR;
use winapi::shared::windef::{HDC, HGLRC};
use winapi::um::wingdi::{self, wglCreateContext, wglDeleteContext, wglGetCurrentContext};
use winapi::um::wingdi::{wglGetCurrentDC, wglGetProcAddress, wglMakeCurrent, wglShareLists};

type WglSwapIntervalExt = unsafe extern "system" fn(interval: c_int) -> BOOL;
type WglGetSwapIntervalExt = unsafe extern "system" fn() -> c_int;

lazy_static! {
    static ref OPENGL_LIBRARY: Option<Library> = Library::open(&["opengl32.dll"]);
}

/// A WGL context, rendering to a hidden window when owned.
pub struct WglContext {
    dc: HDC,
    glrc: HGLRC,
    is_owned: bool,
    // Destroyed after the context.
    window: Option<Win32Window>,
}

// HDCs and HGLRCs may be bound on any thread; binding is serialized by the caller.
unsafe impl Send for WglContext {}
unsafe impl Sync for WglContext {}

/// The WGL backend.
pub struct WglBackend;

impl WglContext {
    fn new(spec: &GlContextSpec, share_with: Option<&WglContext>) -> Result<WglContext, Error> {
        // The window's pixel format has no pbuffer, so the backbuffer is the window itself.
        if spec.width() != 1 || spec.height() != 1 {
            error!("Non-default backbuffer sizes are not supported by the WGL backend: {}x{}",
                   spec.width(),
                   spec.height());
            return Err(Error::InvalidBackbufferSize { width: spec.width(), height: spec.height() });
        }
        if spec.native_window.is_some() {
            return Err(Error::IncompatibleNativeWindow);
        }
        spec.warn_if_debug_unsupported("WGL");

        let window = Win32Window::new(spec.width(), spec.height())?;
        let mut context = WglContext {
            dc: window.dc(),
            glrc: ptr::null_mut(),
            is_owned: true,
            window: Some(window),
        };

        unsafe {
            context.glrc = wglCreateContext(context.dc);
            if context.glrc.is_null() {
                error!("Failed to create GL context.");
                return Err(Error::ContextCreationFailed(WindowingApiError::Failed));
            }
            if let Some(share_with) = share_with {
                if wglShareLists(share_with.glrc, context.glrc) == FALSE {
                    error!("Failed to share GL context.");
                    return Err(Error::ContextCreationFailed(WindowingApiError::BadShareContext));
                }
            }
        }

        Ok(context)
    }

    fn wrapping() -> Result<WglContext, Error> {
        unsafe {
            let glrc = wglGetCurrentContext();
            if glrc.is_null() {
                return Err(Error::NoCurrentContext);
            }
            Ok(WglContext { dc: wglGetCurrentDC(), glrc, is_owned: false, window: None })
        }
    }
}

impl NativeContext for WglContext {
    #[inline]
    fn is_valid(&self) -> bool {
        !self.glrc.is_null()
    }

    #[inline]
    fn is_owned(&self) -> bool {
        self.is_owned
    }

    #[inline]
    fn native_handle(&self) -> usize {
        self.glrc as usize
    }

    fn get_proc_address(&self, name: &str, _: ProcAddressFlags) -> *const c_void {
        let function = get_proc_address(name);
        if !function.is_null() {
            return function;
        }
        proc_address::float_depth_fallback(name, get_proc_address)
    }

    fn swap_buffers(&self) {
        if !self.dc.is_null() {
            unsafe {
                wingdi::SwapBuffers(self.dc);
            }
        }
    }

    fn make_current(&self) -> bool {
        unsafe { wglMakeCurrent(self.dc, self.glrc) != FALSE }
    }

    fn clear_current(&self) {
        unsafe {
            wglMakeCurrent(ptr::null_mut(), ptr::null_mut());
        }
    }

    fn set_swap_interval(&self, interval: i32) -> bool {
        let swap_interval = get_proc_address("wglSwapIntervalEXT");
        let get_swap_interval = get_proc_address("wglGetSwapIntervalEXT");
        if swap_interval.is_null() || get_swap_interval.is_null() {
            return false;
        }
        unsafe {
            let swap_interval: WglSwapIntervalExt = mem::transmute(swap_interval);
            let get_swap_interval: WglGetSwapIntervalExt = mem::transmute(get_swap_interval);
            swap_interval(interval) != FALSE && get_swap_interval() == interval
        }
    }

    fn create_in_share_group(&self, spec: &GlContextSpec)
                             -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(WglContext::new(spec, Some(self))?))
    }
}

impl Drop for WglContext {
    fn drop(&mut self) {
        if !self.is_owned {
            return;
        }
        unsafe {
            if !self.glrc.is_null() {
                if wglGetCurrentContext() == self.glrc {
                    wglMakeCurrent(ptr::null_mut(), ptr::null_mut());
                }
                wglDeleteContext(self.glrc);
                self.glrc = ptr::null_mut();
            }
        }
        self.dc = ptr::null_mut();
        self.window = None;
    }
}

impl Backend for WglBackend {
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(WglContext::new(spec, None)?))
    }

    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(WglContext::wrapping()?))
    }

    fn current_context_id() -> usize {
        unsafe { wglGetCurrentContext() as usize }
    }
}

// `wglGetProcAddress` only knows extension functions and GL 1.2+; GL 1.1 lives in opengl32.dll.
fn get_proc_address(name: &str) -> *const c_void {
    proc_address::with_suffixes(name, DESKTOP_SUFFIXES, |full_name| unsafe {
        let function = wglGetProcAddress(full_name.as_ptr() as LPCSTR) as *const c_void;
        // Some drivers return small integers instead of null.
        if !is_error_address(function) {
            return function;
        }
        match *OPENGL_LIBRARY {
            Some(ref library) => library.symbol(full_name),
            None => ptr::null(),
        }
    })
}

fn is_error_address(function: *const c_void) -> bool {
    matches!(function as isize, -1 | 0 | 1 | 2 | 3)
}

#[cfg(test)]
mod tests {
    use super::is_error_address;
    use std::ptr;

    #[test]
    fn test_error_addresses() {
        assert!(is_error_address(ptr::null()));
        assert!(is_error_address(3 as *const _));
        assert!(is_error_address(-1isize as *const _));
        assert!(!is_error_address(0x1000 as *const _));
    }
}
