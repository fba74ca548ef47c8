// portgfx/src/platform/emscripten/context.rs
//
//! Wrapper for the WebGL context Emscripten exposes through EGL.
//!
//! Emscripten has a single WebGL context per page. Its EGL emulation hands out one placeholder
//! handle, so the native id of the current context is 1 whenever there is one.

use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::egl::types::{EGLConfig, EGLContext, EGLDisplay, EGLSurface};
use crate::egl::{self, Egl};
use crate::platform::generic::egl::context::{self, EglContext, EglPlatform};
use crate::platform::generic::egl::error::ToWindowingApiError;
use crate::proc_address::{self, GLES_SUFFIXES};
use crate::Error;

use std::os::raw::c_void;
use std::ptr;

const VALID_CONTEXT: usize = 1;

/// An Emscripten context.
pub(crate) type EmscriptenContext = EglContext<Emscripten>;

/// The Emscripten backend.
pub struct EmscriptenBackend;

pub(crate) struct Emscripten;

impl EglPlatform for Emscripten {
    fn prepare(spec: &GlContextSpec) -> Result<Emscripten, Error> {
        // The surface is the page's canvas, whose size the page controls.
        debug_assert!(spec.width() == 1 && spec.height() == 1,
                      "Only the default backbuffer size is supported");
        Ok(Emscripten)
    }

    #[inline]
    fn wrapping() -> Emscripten {
        Emscripten
    }

    unsafe fn create_surface(&self,
                             egl: &Egl,
                             egl_display: EGLDisplay,
                             egl_config: EGLConfig,
                             spec: &GlContextSpec)
                             -> Result<EGLSurface, Error> {
        if spec.native_window.is_some() {
            return context::create_surface(egl, egl_display, egl_config, spec);
        }
        let egl_surface = egl.CreateWindowSurface(egl_display, egl_config, ptr::null(), ptr::null());
        if egl_surface == egl::NO_SURFACE {
            return Err(Error::SurfaceCreationFailed(egl.GetError().to_windowing_api_error()));
        }
        Ok(egl_surface)
    }

    unsafe fn make_current(egl: &Egl,
                           _: EGLDisplay,
                           _: EGLSurface,
                           _: EGLSurface,
                           egl_context: EGLContext)
                           -> bool {
        // There is nothing to switch to.
        debug_assert!(egl_context == egl::NO_CONTEXT || egl_context == egl.GetCurrentContext());
        true
    }

    fn context_id(egl_context: EGLContext) -> usize {
        if egl_context == egl::NO_CONTEXT { 0 } else { VALID_CONTEXT }
    }

    fn get_proc_address(name: &str, _: ProcAddressFlags) -> *const c_void {
        proc_address::with_suffixes(name, GLES_SUFFIXES, context::egl_get_proc_address)
    }

    fn set_swap_interval(_: i32) -> bool {
        // The browser paces presentation.
        true
    }
}

impl Backend for EmscriptenBackend {
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(EmscriptenContext::new(spec, None)?))
    }

    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(EmscriptenContext::wrapping()?))
    }

    #[inline]
    fn current_context_id() -> usize {
        context::current_context_id::<Emscripten>()
    }
}
