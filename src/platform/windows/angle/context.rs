// portgfx/src/platform/windows/angle/context.rs
//
//! Wrapper for EGL contexts managed by ANGLE on Windows.

use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::egl::types::{EGLConfig, EGLDisplay, EGLSurface};
use crate::egl::{self, Egl};
use crate::library::Library;
use crate::platform::generic::egl::context::{self, EglContext, EglPlatform};
use crate::platform::generic::egl::error::ToWindowingApiError;
use crate::proc_address::{self, GLES_SUFFIXES};
use crate::Error;
use super::super::window::Win32Window;

use std::os::raw::c_void;
use std::ptr;

lazy_static! {
    static ref GLES_LIBRARY: Option<Library> = Library::open(&["libGLESv2.dll"]);
}

/// An ANGLE context.
pub(crate) type AngleContext = EglContext<Angle>;

/// The ANGLE backend.
pub struct AngleBackend;

/// The per-context state of an ANGLE context: the hidden window of an offscreen context.
pub(crate) struct Angle {
    window: Option<Win32Window>,
}

impl EglPlatform for Angle {
    fn prepare(spec: &GlContextSpec) -> Result<Angle, Error> {
        if spec.native_window.is_some() {
            return Ok(Angle { window: None });
        }
        let window = Win32Window::new(spec.width(), spec.height())?;
        Ok(Angle { window: Some(window) })
    }

    #[inline]
    fn wrapping() -> Angle {
        Angle { window: None }
    }

    unsafe fn get_display(&self, egl: &Egl) -> EGLDisplay {
        if let Some(ref window) = self.window {
            let egl_display = egl.GetDisplay(window.dc() as egl::EGLNativeDisplayType);
            if egl_display != egl::NO_DISPLAY {
                return egl_display;
            }
            warn!("Failed to get an EGL display for the window's device context; using the \
                   default display.");
        }
        egl.GetDisplay(egl::DEFAULT_DISPLAY)
    }

    unsafe fn create_surface(&self,
                             egl: &Egl,
                             egl_display: EGLDisplay,
                             egl_config: EGLConfig,
                             spec: &GlContextSpec)
                             -> Result<EGLSurface, Error> {
        let window = match self.window {
            Some(ref window) => window.window() as egl::EGLNativeWindowType,
            None => return context::create_surface(egl, egl_display, egl_config, spec),
        };
        let egl_surface = egl.CreateWindowSurface(egl_display, egl_config, window, ptr::null());
        if egl_surface == egl::NO_SURFACE {
            return Err(Error::SurfaceCreationFailed(egl.GetError().to_windowing_api_error()));
        }
        Ok(egl_surface)
    }

    fn get_proc_address(name: &str, _: ProcAddressFlags) -> *const c_void {
        proc_address::with_suffixes(name, GLES_SUFFIXES, |full_name| {
            let function = context::egl_get_proc_address(full_name);
            if !function.is_null() {
                return function;
            }
            match *GLES_LIBRARY {
                Some(ref library) => library.symbol(full_name),
                None => ptr::null(),
            }
        })
    }
}

impl Backend for AngleBackend {
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(AngleContext::new(spec, None)?))
    }

    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(AngleContext::wrapping()?))
    }

    #[inline]
    fn current_context_id() -> usize {
        context::current_context_id::<Angle>()
    }
}
