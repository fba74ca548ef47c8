//! Declarations common to all platform contexts.

use crate::Error;

use euclid::default::Size2D;
use rwh_06::RawWindowHandle;
use std::os::raw::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_CONTEXT_ID: AtomicUsize = AtomicUsize::new(1);
static NEXT_SHARE_GROUP_ID: AtomicUsize = AtomicUsize::new(1);

/// Options for creating a native context.
///
/// Not every backend honors every field; a backend that can't honor a field either fails creation
/// (for example WGL with a non-default backbuffer size) or logs a warning and ignores it.
#[derive(Clone, Debug, PartialEq)]
pub struct GlContextSpec {
    /// Size of the offscreen backbuffer. Ignored when `native_window` is set.
    pub backbuffer_size: Size2D<i32>,
    /// Depth buffer bits. 0 means no depth buffer.
    pub depthbuffer_bit_depth: i32,
    /// The window to render into. `None` renders offscreen.
    pub native_window: Option<RawWindowHandle>,
    /// Requests a debug context. Only the GLX backend can create one.
    pub debug_context_enabled: bool,
}

impl Default for GlContextSpec {
    fn default() -> GlContextSpec {
        GlContextSpec {
            backbuffer_size: Size2D::new(1, 1),
            depthbuffer_bit_depth: 0,
            native_window: None,
            debug_context_enabled: false,
        }
    }
}

impl GlContextSpec {
    /// Creates a spec for an offscreen context with a backbuffer of the given size.
    pub fn new(width: i32, height: i32) -> GlContextSpec {
        GlContextSpec { backbuffer_size: Size2D::new(width, height), ..GlContextSpec::default() }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.backbuffer_size.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.backbuffer_size.height
    }

    pub(crate) fn warn_if_debug_unsupported(&self, backend: &str) {
        if self.debug_context_enabled {
            warn!("Debug contexts are not supported by the {} backend; ignoring the request.",
                  backend);
        }
    }
}

bitflags! {
    /// How [`NativeContext::get_proc_address`] may resolve an entry point.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ProcAddressFlags: u32 {
        /// The entry point belongs to core GL. Prefer the driver library's own export, since some
        /// loaders hand out no-op stubs for functions the driver doesn't implement.
        const CORE = 1 << 0;
        /// Use only the portable loader; never search driver libraries directly.
        const PURE = 1 << 1;
    }
}

/// One native rendering context, as wrapped by a [`crate::GlContext`].
///
/// Implementations either own the native context (and destroy it when dropped) or merely refer to
/// a context created outside this crate.
pub trait NativeContext: Send + Sync {
    /// Whether the native context was allocated.
    fn is_valid(&self) -> bool;

    /// Whether dropping this object destroys the native context.
    fn is_owned(&self) -> bool;

    /// The integer value of the native handle, comparable to
    /// [`Backend::current_context_id`].
    fn native_handle(&self) -> usize;

    /// Resolves a GL entry point, trying vendor suffixes. Returns null if unresolved.
    fn get_proc_address(&self, name: &str, flags: ProcAddressFlags) -> *const c_void;

    /// Presents the backbuffer. A no-op when there is no window surface.
    fn swap_buffers(&self);

    /// Makes the native context current on the calling thread.
    fn make_current(&self) -> bool;

    /// Makes no native context current on the calling thread.
    fn clear_current(&self);

    /// Re-reads any state that may have changed while the context was current elsewhere.
    fn refresh(&self) {}

    /// Releases per-thread native state.
    fn cleanup_thread(&self) {}

    /// Sets the swap interval of the context current on this thread.
    fn set_swap_interval(&self, interval: i32) -> bool;

    /// Creates a new owned native context whose GPU objects are shared with this one.
    fn create_in_share_group(&self, spec: &GlContextSpec)
                             -> Result<Box<dyn NativeContext>, Error>;
}

/// The static half of a backend: creation and current-context queries.
pub trait Backend {
    /// Creates an owned native context that shares nothing.
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error>;

    /// Wraps the native context current on the calling thread without taking ownership.
    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error>;

    /// The handle of the native context current on the calling thread, or 0.
    fn current_context_id() -> usize;
}

pub(crate) fn create_id() -> usize {
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn create_share_group_id() -> usize {
    NEXT_SHARE_GROUP_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::{create_id, create_share_group_id, GlContextSpec, ProcAddressFlags};

    #[test]
    fn test_default_spec() {
        let spec = GlContextSpec::default();
        assert_eq!((spec.width(), spec.height()), (1, 1));
        assert_eq!(spec.depthbuffer_bit_depth, 0);
        assert!(spec.native_window.is_none());
        assert!(!spec.debug_context_enabled);
    }

    #[test]
    fn test_ids_are_unique_and_nonzero() {
        let (a, b) = (create_id(), create_id());
        assert!(a != 0 && b != 0);
        assert_ne!(a, b);
        let (c, d) = (create_share_group_id(), create_share_group_id());
        assert!(c != 0 && d != 0);
        assert_ne!(c, d);
    }

    #[test]
    fn test_proc_address_flags() {
        assert_eq!(ProcAddressFlags::CORE.bits(), 1);
        assert_eq!(ProcAddressFlags::PURE.bits(), 2);
        assert!((ProcAddressFlags::CORE | ProcAddressFlags::PURE).contains(ProcAddressFlags::PURE));
    }
}
