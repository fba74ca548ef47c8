// portgfx/src/platform/unix/glx/context.rs
//
//! Wrapper for GLX contexts.

use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::proc_address::{self, DESKTOP_SUFFIXES};
use crate::{Error, WindowingApiError};
use super::ffi::{self, EntryPoints, GlxCreateContextAttribsArb, GlxSwapIntervalSgi};
use super::ffi::{GLX_CONTEXT_DEBUG_BIT_ARB, GLX_CONTEXT_FLAGS_ARB};

use std::collections::HashSet;
use std::env;
use std::ffi::{CStr, CString};
use std::mem;
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::process::Command;
use std::ptr;
use std::sync::{Mutex, OnceLock, PoisonError};
use x11_dl::glx::{GLXContext, GLXDrawable, GLXFBConfig};
use x11_dl::glx::{GLX_DEPTH_SIZE, GLX_DOUBLEBUFFER, GLX_RENDER_TYPE, GLX_RGBA, GLX_RGBA_TYPE};
use x11_dl::glx::GLX_USE_GL;
use x11_dl::xlib::{self, Colormap, Display, Window, XSetWindowAttributes, XVisualInfo};

static DEFAULT_DISPLAY_NAME: &str = ":0";

lazy_static! {
    // Some GLX implementations keep the name pointer passed to `glXGetProcAddressARB`, so every
    // name handed to it lives as long as the process.
    static ref INTERNED_NAMES: Mutex<HashSet<CString>> = Mutex::new(HashSet::new());
}

static X_SERVER_RUNNING: OnceLock<Option<bool>> = OnceLock::new();

/// A GLX context, rendering to a hidden X window when owned.
pub struct GlxContext {
    display: *mut Display,
    colormap: Colormap,
    window: Window,
    glx_context: GLXContext,
    drawable: GLXDrawable,
    is_owned: bool,
}

// Xlib is only used from the thread the context is current on.
unsafe impl Send for GlxContext {}
unsafe impl Sync for GlxContext {}

/// The GLX backend.
pub struct GlxBackend;

impl GlxContext {
    fn new(spec: &GlContextSpec, share_with: Option<&GlxContext>) -> Result<GlxContext, Error> {
        let entry_points = ffi::entry_points()?;
        if spec.native_window.is_some() {
            return Err(Error::IncompatibleNativeWindow);
        }

        let display_name = env::var("DISPLAY")
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_owned());
        // Connecting to a display that has no server behind it blocks for seconds.
        if is_local_display(&display_name) && x_server_running() == Some(false) {
            error!("Failed to get X display: no X server is running.");
            return Err(Error::ConnectionFailed);
        }
        let x_screen = match screen_number(&display_name) {
            Some(x_screen) => x_screen,
            None => {
                error!("failed to parse display_name=\"{}\"", display_name);
                return Err(Error::ConnectionFailed);
            }
        };

        let mut context = GlxContext {
            display: ptr::null_mut(),
            colormap: 0,
            window: 0,
            glx_context: ptr::null_mut(),
            drawable: 0,
            is_owned: true,
        };

        // On failure, `context` is dropped and releases whatever was already acquired.
        unsafe {
            let display_name = CString::new(display_name).map_err(|_| Error::ConnectionFailed)?;
            context.display = (entry_points.XOpenDisplay)(display_name.as_ptr());
            if context.display.is_null() {
                return Err(Error::ConnectionFailed);
            }
            if (entry_points.glXQueryExtension)(context.display,
                                                ptr::null_mut(),
                                                ptr::null_mut()) == xlib::False {
                error!("X connection does not support GLX.");
                return Err(Error::RequiredExtensionUnavailable);
            }

            let mut attributes = [
                GLX_USE_GL,
                GLX_RGBA,
                GLX_DOUBLEBUFFER,
                GLX_DEPTH_SIZE, spec.depthbuffer_bit_depth,
                0,
            ];
            let visual_info = (entry_points.glXChooseVisual)(context.display,
                                                             x_screen,
                                                             attributes.as_mut_ptr());
            if visual_info.is_null() {
                return Err(Error::NoPixelFormatFound);
            }
            let result = context.create_window(entry_points, &*visual_info, spec);
            let share_context = share_with.map_or(ptr::null_mut(), |other| other.glx_context);
            if result.is_ok() {
                let display = context.display;
                context.glx_context = create_with_fallback(|| {
                    create_context_attribs_arb(entry_points,
                                               display,
                                               (*visual_info).screen,
                                               share_context,
                                               spec)
                }, || create_context(entry_points, display, visual_info, share_context, spec));
            }
            (entry_points.XFree)(visual_info as *mut c_void);
            result?;

            if context.glx_context.is_null() {
                return Err(Error::ContextCreationFailed(WindowingApiError::Failed));
            }
        }

        Ok(context)
    }

    unsafe fn create_window(&mut self,
                            entry_points: &EntryPoints,
                            visual_info: &XVisualInfo,
                            spec: &GlContextSpec)
                            -> Result<(), Error> {
        let root = (entry_points.XRootWindow)(self.display, visual_info.screen);
        self.colormap = (entry_points.XCreateColormap)(self.display,
                                                       root,
                                                       visual_info.visual,
                                                       xlib::AllocNone);

        let mut window_attributes: XSetWindowAttributes = mem::zeroed();
        window_attributes.border_pixel = 0;
        window_attributes.colormap = self.colormap;
        self.window = (entry_points.XCreateWindow)(self.display,
                                                   root,
                                                   0,
                                                   0,
                                                   spec.width().max(1) as c_uint,
                                                   spec.height().max(1) as c_uint,
                                                   0,
                                                   visual_info.depth,
                                                   xlib::InputOutput as c_uint,
                                                   visual_info.visual,
                                                   xlib::CWBorderPixel | xlib::CWColormap,
                                                   &mut window_attributes);
        if self.window == 0 {
            return Err(Error::SurfaceCreationFailed(WindowingApiError::Failed));
        }
        self.drawable = self.window;
        Ok(())
    }

    fn wrapping() -> Result<GlxContext, Error> {
        let entry_points = ffi::entry_points()?;
        unsafe {
            let display = (entry_points.glXGetCurrentDisplay)();
            let drawable = (entry_points.glXGetCurrentDrawable)();
            let glx_context = (entry_points.glXGetCurrentContext)();
            if display.is_null() || drawable == 0 || glx_context.is_null() {
                return Err(Error::NoCurrentContext);
            }
            Ok(GlxContext { display, colormap: 0, window: 0, glx_context, drawable, is_owned: false })
        }
    }
}

impl NativeContext for GlxContext {
    #[inline]
    fn is_valid(&self) -> bool {
        !self.glx_context.is_null()
    }

    #[inline]
    fn is_owned(&self) -> bool {
        self.is_owned
    }

    #[inline]
    fn native_handle(&self) -> usize {
        self.glx_context as usize
    }

    fn get_proc_address(&self, name: &str, _: ProcAddressFlags) -> *const c_void {
        let function = get_proc_address(name);
        if !function.is_null() {
            return function;
        }
        proc_address::float_depth_fallback(name, get_proc_address)
    }

    fn swap_buffers(&self) {
        if self.display.is_null() || self.drawable == 0 {
            return;
        }
        if let Ok(entry_points) = ffi::entry_points() {
            unsafe { (entry_points.glXSwapBuffers)(self.display, self.drawable) }
        }
    }

    fn make_current(&self) -> bool {
        match ffi::entry_points() {
            Ok(entry_points) => unsafe {
                (entry_points.glXMakeCurrent)(self.display, self.drawable, self.glx_context) !=
                    xlib::False
            },
            Err(_) => false,
        }
    }

    fn clear_current(&self) {
        if let Ok(entry_points) = ffi::entry_points() {
            unsafe {
                (entry_points.glXMakeCurrent)(self.display, 0, ptr::null_mut());
            }
        }
    }

    fn set_swap_interval(&self, interval: i32) -> bool {
        let swap_interval = get_proc_address("glXSwapIntervalSGI");
        if swap_interval.is_null() {
            return false;
        }
        unsafe {
            let swap_interval: GlxSwapIntervalSgi = mem::transmute(swap_interval);
            swap_interval(interval) == 0
        }
    }

    fn create_in_share_group(&self, spec: &GlContextSpec)
                             -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(GlxContext::new(spec, Some(self))?))
    }
}

impl Drop for GlxContext {
    fn drop(&mut self) {
        if !self.is_owned {
            return;
        }
        let entry_points = match ffi::entry_points() {
            Ok(entry_points) => entry_points,
            Err(_) => return,
        };
        unsafe {
            if !self.glx_context.is_null() {
                (entry_points.glXDestroyContext)(self.display, self.glx_context);
                self.glx_context = ptr::null_mut();
            }
            if self.window != 0 {
                (entry_points.XDestroyWindow)(self.display, self.window);
                self.window = 0;
                self.drawable = 0;
            }
            if self.colormap != 0 {
                (entry_points.XFreeColormap)(self.display, self.colormap);
                self.colormap = 0;
            }
            if !self.display.is_null() {
                (entry_points.XCloseDisplay)(self.display);
                self.display = ptr::null_mut();
            }
        }
    }
}

impl Backend for GlxBackend {
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(GlxContext::new(spec, None)?))
    }

    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error> {
        Ok(Box::new(GlxContext::wrapping()?))
    }

    fn current_context_id() -> usize {
        match ffi::entry_points() {
            Ok(entry_points) => unsafe { (entry_points.glXGetCurrentContext)() as usize },
            Err(_) => 0,
        }
    }
}

/// Returns the context made by `preferred`, calling `fallback` only if that one is null.
fn create_with_fallback<A, B>(preferred: A, fallback: B) -> GLXContext
                              where A: FnOnce() -> GLXContext, B: FnOnce() -> GLXContext {
    let glx_context = preferred();
    if !glx_context.is_null() {
        return glx_context;
    }
    fallback()
}

unsafe fn create_context_attribs_arb(entry_points: &EntryPoints,
                                     display: *mut Display,
                                     x_screen: c_int,
                                     share_context: GLXContext,
                                     spec: &GlContextSpec)
                                     -> GLXContext {
    // Looked up directly by its exact name: some drivers return a stub for any name starting with
    // "gl", so a suffixed lookup would find something for a missing extension.
    let create_context_attribs =
        (entry_points.glXGetProcAddressARB)(b"glXCreateContextAttribsARB\0".as_ptr());
    if create_context_attribs.is_null() {
        info!("glXCreateContextAttribsARB not supported");
        return ptr::null_mut();
    }
    let create_context_attribs: GlxCreateContextAttribsArb =
        mem::transmute(create_context_attribs);

    let fb_attributes = [
        GLX_DOUBLEBUFFER,   xlib::True,
        GLX_DEPTH_SIZE,     spec.depthbuffer_bit_depth,
        0,
    ];
    let mut fb_config_count = 0;
    let fb_configs = (entry_points.glXChooseFBConfig)(display,
                                                      x_screen,
                                                      fb_attributes.as_ptr(),
                                                      &mut fb_config_count);
    if fb_configs.is_null() || fb_config_count == 0 {
        error!("glXChooseFBConfig() failed");
        if !fb_configs.is_null() {
            (entry_points.XFree)(fb_configs as *mut c_void);
        }
        return ptr::null_mut();
    }
    let fb_config: GLXFBConfig = *fb_configs;

    let debug_flag = if spec.debug_context_enabled { GLX_CONTEXT_DEBUG_BIT_ARB } else { 0 };
    let context_attributes = [
        GLX_RENDER_TYPE,        GLX_RGBA_TYPE,
        GLX_CONTEXT_FLAGS_ARB,  debug_flag,
        0,
    ];
    let glx_context = create_context_attribs(display,
                                             fb_config,
                                             share_context,
                                             xlib::True,
                                             context_attributes.as_ptr());
    (entry_points.XFree)(fb_configs as *mut c_void);
    if glx_context.is_null() {
        error!("glXCreateContextAttribsARB() failed");
    }
    glx_context
}

unsafe fn create_context(entry_points: &EntryPoints,
                         display: *mut Display,
                         visual_info: *mut XVisualInfo,
                         share_context: GLXContext,
                         spec: &GlContextSpec)
                         -> GLXContext {
    if spec.debug_context_enabled {
        warn!("glXCreateContext() does not support debug context creation");
    }
    let glx_context = (entry_points.glXCreateContext)(display,
                                                      visual_info,
                                                      share_context,
                                                      xlib::True);
    if glx_context.is_null() {
        error!("glXCreateContext() failed");
    }
    glx_context
}

fn get_proc_address(name: &str) -> *const c_void {
    let entry_points = match ffi::entry_points() {
        Ok(entry_points) => entry_points,
        Err(_) => return ptr::null(),
    };
    proc_address::with_suffixes(name, DESKTOP_SUFFIXES, |full_name| unsafe {
        (entry_points.glXGetProcAddressARB)(intern(full_name) as *const u8)
    })
}

fn intern(name: &CStr) -> *const c_char {
    let mut names = INTERNED_NAMES.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(interned) = names.get(name) {
        return interned.as_ptr();
    }
    let interned = name.to_owned();
    // The heap buffer of a `CString` doesn't move when the set grows.
    let pointer = interned.as_ptr();
    names.insert(interned);
    pointer
}

/// Whether an X server process is running, or `None` if that can't be determined.
fn x_server_running() -> Option<bool> {
    *X_SERVER_RUNNING.get_or_init(|| {
        let output = Command::new("pgrep").args(["-c", "^(Xorg|Xvfb|Xwayland)$"]).output().ok()?;
        let count = String::from_utf8_lossy(&output.stdout).trim().parse::<u32>().ok()?;
        debug!("pgrep found {} X server processes", count);
        Some(count > 0)
    })
}

fn is_local_display(display_name: &str) -> bool {
    display_name.split(':').next().map_or(true, |host| host.is_empty() || host == "localhost")
}

/// Parses the screen out of a display name of the form `[host]:display[.screen]`.
fn screen_number(display_name: &str) -> Option<c_int> {
    let (host, display) = display_name.split_once(':')?;
    if !host.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'.' || byte == b'-') {
        return None;
    }
    let (display, screen) = match display.split_once('.') {
        Some((display, screen)) => (display, screen),
        None => (display, ""),
    };
    let is_number = |text: &str| text.bytes().all(|byte| byte.is_ascii_digit());
    if display.is_empty() || !is_number(display) || !is_number(screen) {
        return None;
    }
    if screen.is_empty() {
        return Some(0);
    }
    screen.parse().ok()
}
