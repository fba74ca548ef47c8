// portgfx/src/gl_context.rs
//
//! The platform-independent `GlContext` and the per-thread current-context API.

use crate::context::{self, Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::platform::default::NativeBackend;
use crate::registry;
use crate::stamp::Stamp;
use crate::Error;

use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::os::raw::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A shared handle to a [`GlContext`].
pub type GlContextPtr = Arc<GlContext>;

/// A native OpenGL or OpenGL ES rendering context.
///
/// A `GlContext` either owns its native context, in which case the native context is destroyed
/// when the last `GlContextPtr` goes away, or wraps a native context created elsewhere and never
/// destroys it.
///
/// Making a context current on a thread keeps it alive: the thread's binding counts as a strong
/// reference until [`GlContext::make_current`] binds something else, [`GlContext::cleanup_thread`]
/// runs, or the thread exits. Native teardown is therefore deferred until no thread has the
/// context current.
pub struct GlContext {
    id: usize,
    share_group_id: AtomicUsize,
    gl_context_id: AtomicUsize,
    stamp: Stamp,
    native: Box<dyn NativeContext>,
}

impl GlContext {
    /// Creates a new owned context in a new share group.
    ///
    /// Returns `None` if the native API could not allocate a context; the reason is logged.
    pub fn create(spec: &GlContextSpec) -> Option<GlContextPtr> {
        let native = NativeBackend::create_context(spec);
        GlContext::from_result(native, context::create_share_group_id())
    }

    /// Creates a new owned context sharing GPU objects with the context current on this thread.
    ///
    /// Returns `None` if no context is current or creation fails. Creating the context does not
    /// make it current.
    pub fn create_in_current_share_group(spec: &GlContextSpec) -> Option<GlContextPtr> {
        let current = match GlContext::get_current(false) {
            Some(current) => current,
            None => {
                error!("Failed to create GL context: {}", Error::NoCurrentContext);
                return None;
            }
        };
        let native = current.native.create_in_share_group(spec);
        GlContext::from_result(native, current.share_group_id())
    }

    /// Wraps the native context current on this thread, which was created outside this crate.
    ///
    /// Returns `None` if no native context is current.
    pub fn create_wrapping() -> Option<GlContextPtr> {
        let native = NativeBackend::create_wrapping_context();
        GlContext::from_result(native, context::create_share_group_id())
    }

    fn from_result(native: Result<Box<dyn NativeContext>, Error>, share_group_id: usize)
                   -> Option<GlContextPtr> {
        match native {
            Ok(native) if native.is_valid() => Some(GlContext::from_native(native, share_group_id)),
            Ok(_) => {
                error!("Failed to create GL context: the native context is invalid.");
                None
            }
            Err(err) => {
                error!("Failed to create GL context: {}", err);
                None
            }
        }
    }

    pub(crate) fn from_native(native: Box<dyn NativeContext>, share_group_id: usize)
                              -> GlContextPtr {
        let gl_context_id = native.native_handle();
        let context = Arc::new(GlContext {
            id: context::create_id(),
            share_group_id: AtomicUsize::new(share_group_id),
            gl_context_id: AtomicUsize::new(gl_context_id),
            stamp: Stamp::new(),
            native,
        });
        registry::register(&context);
        context
    }

    /// Returns the `GlContext` for the native context current on this thread.
    ///
    /// A native context that hasn't been seen before is wrapped on first observation.
    ///
    /// With `check_stamp` false, a cached `GlContext` is trusted as soon as its native handle
    /// matches the current one. A driver that reuses the handle value of a destroyed context for
    /// a new one defeats this check and the stale `GlContext` is returned. With `check_stamp`
    /// true the stamp object is read back from the driver, which always detects reuse but costs
    /// extra GL calls.
    pub fn get_current(check_stamp: bool) -> Option<GlContextPtr> {
        let mut current = None;
        if let Some(previous) = registry::thread_current() {
            if previous.is_current_gl_context() {
                if !check_stamp || previous.check_stamp() {
                    current = Some(previous);
                } else {
                    previous.gl_context_id.store(0, Ordering::Release);
                }
            }
        }

        let gl_context_id = NativeBackend::current_context_id();
        if gl_context_id != 0 {
            if current.is_none() {
                current = registry::find(gl_context_id);
                if let Some(ref candidate) = current {
                    if candidate.gl_context_id() != gl_context_id ||
                            (check_stamp && !candidate.check_stamp()) {
                        candidate.gl_context_id.store(0, Ordering::Release);
                        current = None;
                    }
                }
            }
            if current.is_none() {
                current = GlContext::create_wrapping();
            }
        } else {
            current = None;
        }

        registry::set_thread_current(current.clone());
        if let Some(ref context) = current {
            context.maybe_create_stamp();
        }
        current
    }

    /// Shorthand for [`GlContext::get_current`] without the stamp check.
    #[inline]
    pub fn current() -> Option<GlContextPtr> {
        GlContext::get_current(false)
    }

    /// Makes `context` current on this thread, or clears the current context if `None`.
    ///
    /// Returns false, leaving no context current, if the native API refuses.
    pub fn make_current(context: Option<&GlContextPtr>) -> bool {
        let current = GlContext::get_current(false);
        let unchanged = match (context, current.as_ref()) {
            (Some(context), Some(current)) => Arc::ptr_eq(context, current),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return true;
        }

        if let Some(ref current) = current {
            current.native.clear_current();
        }
        registry::set_thread_current(None);

        if let Some(context) = context {
            if context.gl_context_id() == 0 || !context.native.make_current() {
                error!("Failed to make context current.");
                return false;
            }
            registry::set_thread_current(Some(context.clone()));
            context.maybe_create_stamp();
        }

        // `current` may hold the last reference to the old context; it is released here, after
        // it stopped being current.
        drop(current);
        true
    }

    /// The id of the `GlContext` current on this thread, or 0.
    pub fn current_id() -> usize {
        GlContext::get_current(false).map_or(0, |context| context.id())
    }

    /// The native handle current on this thread, as the backend reports it, or 0.
    #[inline]
    pub fn current_gl_context_id() -> usize {
        NativeBackend::current_context_id()
    }

    /// Re-reads native state of the current context that may have changed behind our back.
    pub fn refresh_current() {
        if let Some(context) = GlContext::get_current(false) {
            context.native.refresh();
        }
    }

    /// Clears this thread's current context and releases its per-thread native state.
    ///
    /// The context can be made current again later, at the cost of reinitializing that state.
    pub fn cleanup_thread() {
        let current = GlContext::get_current(false);
        GlContext::make_current(None);
        if let Some(current) = current {
            current.native.cleanup_thread();
        }
    }

    /// A process-unique identifier, never 0.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// The share group this context belongs to.
    #[inline]
    pub fn share_group_id(&self) -> usize {
        self.share_group_id.load(Ordering::Acquire)
    }

    /// Assigns a wrapping context to a share group.
    ///
    /// Only wrapping contexts can be reassigned, since the library can't know which contexts an
    /// externally created context shares with. Calls on owned contexts are logged and ignored.
    pub fn set_share_group_id(&self, share_group_id: usize) {
        if self.is_owned() {
            error!("Cannot set the share group of an owned GlContext.");
            return;
        }
        self.share_group_id.store(share_group_id, Ordering::Release);
    }

    /// The integer value of the native handle, or 0 once the handle is known to be stale.
    #[inline]
    pub fn gl_context_id(&self) -> usize {
        self.gl_context_id.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.native.is_valid()
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        self.native.is_owned()
    }

    /// Presents the backbuffer.
    #[inline]
    pub fn swap_buffers(&self) {
        self.native.swap_buffers()
    }

    /// Resolves a GL entry point by name, trying vendor suffixes. Returns null if unresolved.
    #[inline]
    pub fn get_proc_address(&self, name: &str, flags: ProcAddressFlags) -> *const c_void {
        self.native.get_proc_address(name, flags)
    }

    /// Whether the native context current on this thread carries this context's stamp.
    ///
    /// False if this context has never been stamped.
    pub fn does_current_context_match(&self) -> bool {
        self.stamp.shader() != 0 && self.check_stamp()
    }

    pub(crate) fn native(&self) -> &dyn NativeContext {
        &*self.native
    }

    fn is_current_gl_context(&self) -> bool {
        let gl_context_id = self.gl_context_id();
        gl_context_id != 0 && gl_context_id == NativeBackend::current_context_id()
    }

    fn maybe_create_stamp(&self) {
        self.stamp.maybe_create(&*self.native, &self.stamp_payload())
    }

    fn check_stamp(&self) -> bool {
        self.stamp.check(&*self.native, &self.stamp_payload())
    }

    fn stamp_payload(&self) -> String {
        format!("portgfx:{:x}\n", self.id)
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        registry::unregister(self.native.native_handle(), self);
    }
}

impl Debug for GlContext {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("GlContext")
         .field("id", &self.id)
         .field("share_group_id", &self.share_group_id())
         .field("gl_context_id", &format_args!("{:#x}", self.gl_context_id()))
         .field("is_owned", &self.is_owned())
         .finish()
    }
}

/// Restores the context that was current on this thread when the guard was created.
#[must_use]
pub struct CurrentContextGuard {
    previous: Option<GlContextPtr>,
    phantom: PhantomData<*const ()>,
}

impl CurrentContextGuard {
    pub fn new() -> CurrentContextGuard {
        CurrentContextGuard { previous: GlContext::get_current(false), phantom: PhantomData }
    }

    /// Remembers the current context, then makes `context` current.
    ///
    /// Returns `None`, with the remembered context current again, if `context` can't be made
    /// current.
    pub fn make_current(context: &GlContextPtr) -> Option<CurrentContextGuard> {
        let guard = CurrentContextGuard::new();
        if GlContext::make_current(Some(context)) {
            Some(guard)
        } else {
            None
        }
    }
}

impl Drop for CurrentContextGuard {
    fn drop(&mut self) {
        GlContext::make_current(self.previous.as_ref());
    }
}
