// portgfx/src/platform/generic/egl/context.rs
//
//! Functionality common to backends using EGL contexts.
//!
//! `EglContext` does everything the same way on every EGL implementation except for the steps
//! collected in `EglPlatform`, which each backend overrides as it needs.

use crate::context::{GlContextSpec, NativeContext, ProcAddressFlags};
use crate::egl::types::{EGLConfig, EGLContext, EGLDisplay, EGLSurface, EGLint};
use crate::egl::{self, Egl};
use crate::{Error, WindowingApiError};
use super::error::ToWindowingApiError;
use super::library::{self, EGL_FUNCTIONS};

use rwh_06::RawWindowHandle;
use std::ffi::CStr;
use std::mem;
use std::os::raw::c_void;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

const BUFFER_SIZE: EGLint = 24;

/// The steps of context creation and binding that vary between EGL implementations.
pub(crate) trait EglPlatform: Sized + 'static {
    /// Acquires per-context native resources that must exist before the display, such as a window.
    fn prepare(spec: &GlContextSpec) -> Result<Self, Error>;

    /// The per-context state of a wrapped context.
    fn wrapping() -> Self;

    unsafe fn get_display(&self, egl: &Egl) -> EGLDisplay {
        egl.GetDisplay(egl::DEFAULT_DISPLAY)
    }

    /// Creates a window surface for `spec.native_window`, or a pbuffer of the backbuffer size.
    unsafe fn create_surface(&self,
                             egl: &Egl,
                             egl_display: EGLDisplay,
                             egl_config: EGLConfig,
                             spec: &GlContextSpec)
                             -> Result<EGLSurface, Error> {
        create_surface(egl, egl_display, egl_config, spec)
    }

    unsafe fn create_context(&self,
                             egl: &Egl,
                             egl_display: EGLDisplay,
                             egl_config: EGLConfig,
                             share_context: EGLContext,
                             attributes: &[EGLint])
                             -> EGLContext {
        egl.CreateContext(egl_display, egl_config, share_context, attributes.as_ptr())
    }

    unsafe fn get_current_context(egl: &Egl) -> EGLContext {
        egl.GetCurrentContext()
    }

    unsafe fn make_current(egl: &Egl,
                           egl_display: EGLDisplay,
                           egl_draw_surface: EGLSurface,
                           egl_read_surface: EGLSurface,
                           egl_context: EGLContext)
                           -> bool {
        egl.MakeCurrent(egl_display, egl_draw_surface, egl_read_surface, egl_context) != egl::FALSE
    }

    /// The value reported as the native handle of `egl_context`.
    fn context_id(egl_context: EGLContext) -> usize {
        egl_context as usize
    }

    fn get_proc_address(name: &str, flags: ProcAddressFlags) -> *const c_void;

    fn set_swap_interval(interval: i32) -> bool {
        EGL_FUNCTIONS.with(|egl| unsafe {
            let egl_display = egl.GetCurrentDisplay();
            egl_display != egl::NO_DISPLAY && egl.SwapInterval(egl_display, interval) == egl::TRUE
        })
    }
}

/// An EGL context, owned or wrapped.
pub(crate) struct EglContext<P> where P: EglPlatform {
    egl_display: EGLDisplay,
    egl_surface: EGLSurface,
    egl_draw_surface: AtomicPtr<c_void>,
    egl_read_surface: AtomicPtr<c_void>,
    egl_context: EGLContext,
    is_owned: bool,
    // Dropped after the EGL objects.
    platform: P,
}

// EGL handles may be used from any thread; binding is serialized by the caller.
unsafe impl<P> Send for EglContext<P> where P: EglPlatform {}
unsafe impl<P> Sync for EglContext<P> where P: EglPlatform {}

impl<P> EglContext<P> where P: EglPlatform {
    /// Creates an owned context, sharing objects with `share_with` if given.
    pub(crate) fn new(spec: &GlContextSpec, share_with: Option<&EglContext<P>>)
                      -> Result<EglContext<P>, Error> {
        if !library::is_available() {
            return Err(Error::NoGLLibraryFound);
        }
        spec.warn_if_debug_unsupported("EGL");

        let mut context = EglContext {
            egl_display: egl::NO_DISPLAY,
            egl_surface: egl::NO_SURFACE,
            egl_draw_surface: AtomicPtr::new(ptr::null_mut()),
            egl_read_surface: AtomicPtr::new(ptr::null_mut()),
            egl_context: egl::NO_CONTEXT,
            is_owned: true,
            platform: P::prepare(spec)?,
        };

        // On failure, `context` is dropped and releases whatever was already acquired.
        EGL_FUNCTIONS.with(|egl| {
            unsafe {
                context.egl_display = context.platform.get_display(egl);
                if context.egl_display == egl::NO_DISPLAY {
                    return Err(Error::ConnectionFailed);
                }

                let (mut major, mut minor) = (0, 0);
                if egl.Initialize(context.egl_display, &mut major, &mut minor) == egl::FALSE {
                    let err = egl.GetError().to_windowing_api_error();
                    return Err(Error::InitializationFailed(err));
                }
                if (major, minor) < (1, 2) {
                    return Err(Error::UnsupportedVersion { major, minor });
                }

                let (egl_config, client_version) = choose_config(egl, context.egl_display, spec)?;

                context.egl_surface = context.platform.create_surface(egl,
                                                                      context.egl_display,
                                                                      egl_config,
                                                                      spec)?;
                context.set_current_surfaces(context.egl_surface, context.egl_surface);

                let share_context = share_with.map_or(egl::NO_CONTEXT, |other| other.egl_context);
                let attributes = [
                    egl::CONTEXT_CLIENT_VERSION as EGLint, client_version,
                    egl::NONE as EGLint,
                ];
                context.egl_context = context.platform.create_context(egl,
                                                                      context.egl_display,
                                                                      egl_config,
                                                                      share_context,
                                                                      &attributes);
                if context.egl_context == egl::NO_CONTEXT {
                    let err = egl.GetError().to_windowing_api_error();
                    return Err(Error::ContextCreationFailed(err));
                }
                Ok(())
            }
        })?;

        Ok(context)
    }

    /// Wraps the EGL context current on this thread.
    ///
    /// Contexts bound without a display or without surfaces (see `EGL_KHR_surfaceless_context`)
    /// are accepted.
    pub(crate) fn wrapping() -> Result<EglContext<P>, Error> {
        if !library::is_available() {
            return Err(Error::NoGLLibraryFound);
        }

        EGL_FUNCTIONS.with(|egl| {
            unsafe {
                let egl_context = P::get_current_context(egl);
                if egl_context == egl::NO_CONTEXT {
                    return Err(Error::NoCurrentContext);
                }
                let context = EglContext {
                    egl_display: egl.GetCurrentDisplay(),
                    egl_surface: egl::NO_SURFACE,
                    egl_draw_surface: AtomicPtr::new(ptr::null_mut()),
                    egl_read_surface: AtomicPtr::new(ptr::null_mut()),
                    egl_context,
                    is_owned: false,
                    platform: P::wrapping(),
                };
                context.set_current_surfaces(egl.GetCurrentSurface(egl::DRAW as EGLint),
                                             egl.GetCurrentSurface(egl::READ as EGLint));
                Ok(context)
            }
        })
    }

    fn draw_surface(&self) -> EGLSurface {
        self.egl_draw_surface.load(Ordering::Acquire) as EGLSurface
    }

    fn read_surface(&self) -> EGLSurface {
        self.egl_read_surface.load(Ordering::Acquire) as EGLSurface
    }

    fn set_current_surfaces(&self, egl_draw_surface: EGLSurface, egl_read_surface: EGLSurface) {
        self.egl_draw_surface.store(egl_draw_surface as *mut c_void, Ordering::Release);
        self.egl_read_surface.store(egl_read_surface as *mut c_void, Ordering::Release);
    }
}

impl<P> NativeContext for EglContext<P> where P: EglPlatform {
    #[inline]
    fn is_valid(&self) -> bool {
        self.egl_context != egl::NO_CONTEXT
    }

    #[inline]
    fn is_owned(&self) -> bool {
        self.is_owned
    }

    #[inline]
    fn native_handle(&self) -> usize {
        P::context_id(self.egl_context)
    }

    fn get_proc_address(&self, name: &str, flags: ProcAddressFlags) -> *const c_void {
        P::get_proc_address(name, flags)
    }

    fn swap_buffers(&self) {
        let egl_draw_surface = self.draw_surface();
        if self.egl_display == egl::NO_DISPLAY || egl_draw_surface == egl::NO_SURFACE {
            return;
        }
        EGL_FUNCTIONS.with(|egl| unsafe {
            egl.SwapBuffers(self.egl_display, egl_draw_surface);
        })
    }

    fn make_current(&self) -> bool {
        EGL_FUNCTIONS.with(|egl| unsafe {
            P::make_current(egl,
                            self.egl_display,
                            self.draw_surface(),
                            self.read_surface(),
                            self.egl_context)
        })
    }

    fn clear_current(&self) {
        EGL_FUNCTIONS.with(|egl| unsafe {
            P::make_current(egl,
                            self.egl_display,
                            egl::NO_SURFACE,
                            egl::NO_SURFACE,
                            egl::NO_CONTEXT);
        })
    }

    fn refresh(&self) {
        EGL_FUNCTIONS.with(|egl| unsafe {
            self.set_current_surfaces(egl.GetCurrentSurface(egl::DRAW as EGLint),
                                      egl.GetCurrentSurface(egl::READ as EGLint));
        })
    }

    fn cleanup_thread(&self) {
        // Frees the error status and current context of this thread inside EGL.
        EGL_FUNCTIONS.with(|egl| unsafe {
            egl.ReleaseThread();
        })
    }

    fn set_swap_interval(&self, interval: i32) -> bool {
        P::set_swap_interval(interval)
    }

    fn create_in_share_group(&self, spec: &GlContextSpec)
                             -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(EglContext::<P>::new(spec, Some(self))?))
    }
}

impl<P> Drop for EglContext<P> where P: EglPlatform {
    fn drop(&mut self) {
        if !self.is_owned {
            return;
        }
        let _ = EGL_FUNCTIONS.try_with(|egl| unsafe {
            if self.egl_context != egl::NO_CONTEXT {
                let result = egl.DestroyContext(self.egl_display, self.egl_context);
                debug_assert_ne!(result, egl::FALSE, "eglDestroyContext failed");
                self.egl_context = egl::NO_CONTEXT;
            }
            if self.egl_surface != egl::NO_SURFACE {
                egl.DestroySurface(self.egl_display, self.egl_surface);
                self.egl_surface = egl::NO_SURFACE;
                self.set_current_surfaces(egl::NO_SURFACE, egl::NO_SURFACE);
            }
        });
    }
}

/// Creates a window surface for `spec.native_window`, or a pbuffer of the backbuffer size.
pub(crate) unsafe fn create_surface(egl: &Egl,
                                    egl_display: EGLDisplay,
                                    egl_config: EGLConfig,
                                    spec: &GlContextSpec)
                                    -> Result<EGLSurface, Error> {
    let egl_surface = match spec.native_window {
        Some(ref window) => {
            let window = native_window(window)?;
            egl.CreateWindowSurface(egl_display, egl_config, window, ptr::null())
        }
        None => {
            let attributes = [
                egl::WIDTH as EGLint,   spec.width(),
                egl::HEIGHT as EGLint,  spec.height(),
                egl::NONE as EGLint,
            ];
            egl.CreatePbufferSurface(egl_display, egl_config, attributes.as_ptr())
        }
    };
    if egl_surface == egl::NO_SURFACE {
        return Err(Error::SurfaceCreationFailed(egl.GetError().to_windowing_api_error()));
    }
    Ok(egl_surface)
}

/// The handle of the EGL context current on this thread, as `P` reports it, or 0.
pub(crate) fn current_context_id<P>() -> usize where P: EglPlatform {
    if !library::is_available() {
        return 0;
    }
    EGL_FUNCTIONS.try_with(|egl| unsafe {
        let egl_context = P::get_current_context(egl);
        if egl_context == egl::NO_CONTEXT { 0 } else { P::context_id(egl_context) }
    }).unwrap_or(0)
}

/// Resolves `name` with `eglGetProcAddress`. Returns null if unresolved.
pub(crate) fn egl_get_proc_address(name: &CStr) -> *const c_void {
    if !library::is_available() {
        return ptr::null();
    }
    EGL_FUNCTIONS.with(|egl| unsafe { mem::transmute(egl.GetProcAddress(name.as_ptr())) })
}

// Prefers an OpenGL ES 3 config, falling back to OpenGL ES 2.
unsafe fn choose_config(egl: &Egl, egl_display: EGLDisplay, spec: &GlContextSpec)
                        -> Result<(EGLConfig, EGLint), Error> {
    let surface_type = if spec.native_window.is_some() { egl::WINDOW_BIT } else { egl::PBUFFER_BIT };
    choose_first_config(|renderable_type| {
        let attributes = [
            egl::BUFFER_SIZE as EGLint,     BUFFER_SIZE,
            egl::DEPTH_SIZE as EGLint,      spec.depthbuffer_bit_depth,
            egl::RENDERABLE_TYPE as EGLint, renderable_type,
            egl::SURFACE_TYPE as EGLint,    surface_type as EGLint,
            egl::NONE as EGLint,
        ];
        let mut egl_config = ptr::null();
        let mut config_count = 0;
        let result = egl.ChooseConfig(egl_display,
                                      attributes.as_ptr(),
                                      &mut egl_config,
                                      1,
                                      &mut config_count);
        if result == egl::FALSE {
            return Err(egl.GetError().to_windowing_api_error());
        }
        Ok(if config_count > 0 { Some(egl_config) } else { None })
    })
}

/// Asks `choose` for an OpenGL ES 3 config, then an OpenGL ES 2 one, and returns the first found
/// with its client version.
///
/// `choose` gets the `EGL_RENDERABLE_TYPE` bit. An empty result moves on to the next version; an
/// error is remembered and reported if no version has a config.
fn choose_first_config<T, F>(mut choose: F) -> Result<(T, EGLint), Error>
                             where F: FnMut(EGLint) -> Result<Option<T>, WindowingApiError> {
    let mut last_error = WindowingApiError::Failed;
    let versions = [(egl::OPENGL_ES3_BIT, 3), (egl::OPENGL_ES2_BIT, 2)];
    for &(renderable_type, client_version) in &versions {
        match choose(renderable_type as EGLint) {
            Ok(Some(config)) => return Ok((config, client_version)),
            Ok(None) => debug!("No EGL config for OpenGL ES {}", client_version),
            Err(err) => last_error = err,
        }
    }
    match last_error {
        WindowingApiError::Failed => Err(Error::NoPixelFormatFound),
        err => Err(Error::PixelFormatSelectionFailed(err)),
    }
}

/// Converts a window handle into the window type EGL takes on this platform.
fn native_window(window: &RawWindowHandle) -> Result<egl::EGLNativeWindowType, Error> {
    match *window {
        RawWindowHandle::AndroidNdk(ref handle) => Ok(handle.a_native_window.as_ptr() as _),
        RawWindowHandle::Win32(ref handle) => Ok(handle.hwnd.get() as _),
        RawWindowHandle::Xlib(ref handle) => Ok(handle.window as _),
        RawWindowHandle::Xcb(ref handle) => Ok(handle.window.get() as usize as _),
        RawWindowHandle::Web(_) => Ok(ptr::null()),
        _ => Err(Error::IncompatibleNativeWindow),
    }
}
