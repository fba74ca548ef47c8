// portgfx/src/platform/generic/fake/driver.rs
//
//! State of the simulated driver.
//!
//! Native handles are plain integers. A handle released on a thread is the first one handed out
//! again on that thread, which mimics allocators that reuse freed addresses and makes handle reuse
//! deterministic in tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const FIRST_HANDLE: usize = 0x1000;
const HANDLE_STRIDE: usize = 0x40;

static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(FIRST_HANDLE);

lazy_static! {
    static ref LIVE_CONTEXTS: Mutex<HashMap<usize, NativeState>> = Mutex::new(HashMap::new());
}

thread_local! {
    static CURRENT_HANDLE: Cell<usize> = Cell::new(0);
    static RELEASED_HANDLES: RefCell<Vec<usize>> = RefCell::new(vec![]);
    static THREAD_CLEANUPS: Cell<usize> = Cell::new(0);
    static FAIL_NEXT_CREATION: Cell<bool> = Cell::new(false);
    static ABANDONED_HANDLE: Cell<usize> = Cell::new(0);
}

pub(crate) struct Shader {
    pub(crate) kind: u32,
    pub(crate) source: Vec<u8>,
}

/// GPU objects visible to every context of a share group.
#[derive(Default)]
pub(crate) struct ShareNamespace {
    next_name: u32,
    pub(crate) shaders: HashMap<u32, Shader>,
}

impl ShareNamespace {
    pub(crate) fn create_shader(&mut self, kind: u32) -> u32 {
        self.next_name += 1;
        self.shaders.insert(self.next_name, Shader { kind, source: vec![] });
        self.next_name
    }
}

struct NativeState {
    namespace: Arc<Mutex<ShareNamespace>>,
    swap_interval: i32,
    swap_count: usize,
}

fn live_contexts() -> MutexGuard<'static, HashMap<usize, NativeState>> {
    LIVE_CONTEXTS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Allocates a native context, sharing the namespace of `share_with` if given.
///
/// Returns `None` if `share_with` is not a live context.
pub(crate) fn allocate(share_with: Option<usize>) -> Option<usize> {
    let mut live_contexts = live_contexts();
    let namespace = match share_with {
        Some(handle) => live_contexts.get(&handle)?.namespace.clone(),
        None => Arc::new(Mutex::new(ShareNamespace::default())),
    };
    let handle = RELEASED_HANDLES.try_with(|released| released.borrow_mut().pop())
                                 .ok()
                                 .flatten()
                                 .unwrap_or_else(|| {
                                     NEXT_HANDLE.fetch_add(HANDLE_STRIDE, Ordering::Relaxed)
                                 });
    live_contexts.insert(handle, NativeState { namespace, swap_interval: 1, swap_count: 0 });
    Some(handle)
}

pub(crate) fn release(handle: usize) {
    if live_contexts().remove(&handle).is_none() {
        return;
    }
    if current() == handle {
        let _ = CURRENT_HANDLE.try_with(|current| current.set(0));
    }
    let _ = RELEASED_HANDLES.try_with(|released| released.borrow_mut().push(handle));
}

pub(crate) fn is_live(handle: usize) -> bool {
    live_contexts().contains_key(&handle)
}

pub(crate) fn current() -> usize {
    CURRENT_HANDLE.try_with(Cell::get).unwrap_or(0)
}

/// Binds `handle` to the calling thread; 0 unbinds. Fails for dead handles.
pub(crate) fn bind(handle: usize) -> bool {
    if handle != 0 && !is_live(handle) {
        return false;
    }
    CURRENT_HANDLE.try_with(|current| current.set(handle)).is_ok()
}

/// Runs `f` on the namespace of the context bound to the calling thread.
pub(crate) fn with_current_namespace<F, R>(f: F) -> Option<R>
                                           where F: FnOnce(&mut ShareNamespace) -> R {
    let namespace = live_contexts().get(&current())?.namespace.clone();
    let mut namespace = namespace.lock().unwrap_or_else(PoisonError::into_inner);
    Some(f(&mut namespace))
}

pub(crate) fn record_swap(handle: usize) {
    if let Some(state) = live_contexts().get_mut(&handle) {
        state.swap_count += 1;
    }
}

pub(crate) fn set_swap_interval(handle: usize, interval: i32) -> bool {
    match live_contexts().get_mut(&handle) {
        Some(state) => {
            state.swap_interval = interval;
            true
        }
        None => false,
    }
}

/// Whether a creation failure was requested on this thread. Clears the request.
pub(crate) fn take_creation_failure() -> bool {
    FAIL_NEXT_CREATION.try_with(|fail| fail.replace(false)).unwrap_or(false)
}

pub(crate) fn record_abandoned(handle: usize) {
    let _ = ABANDONED_HANDLE.try_with(|abandoned| abandoned.set(handle));
}

pub(crate) fn record_thread_cleanup() {
    let _ = THREAD_CLEANUPS.try_with(|cleanups| cleanups.set(cleanups.get() + 1));
}

/// Creates a native context the way code outside this crate would, returning its handle.
pub fn create_external_context() -> usize {
    allocate(None).unwrap_or(0)
}

/// Creates a native context sharing GPU objects with `share_with`. Returns 0 on failure.
pub fn create_external_shared_context(share_with: usize) -> usize {
    allocate(Some(share_with)).unwrap_or(0)
}

/// Destroys a native context created with [`create_external_context`].
pub fn destroy_external_context(handle: usize) {
    release(handle)
}

/// Binds a native context to the calling thread behind the library's back. 0 unbinds.
pub fn make_external_current(handle: usize) -> bool {
    bind(handle)
}

/// How many times buffers were swapped on the native context.
pub fn swap_count(handle: usize) -> Option<usize> {
    live_contexts().get(&handle).map(|state| state.swap_count)
}

/// The swap interval last set on the native context.
pub fn swap_interval(handle: usize) -> Option<i32> {
    live_contexts().get(&handle).map(|state| state.swap_interval)
}

/// How many times per-thread state was released on the calling thread.
pub fn thread_cleanup_count() -> usize {
    THREAD_CLEANUPS.try_with(Cell::get).unwrap_or(0)
}

/// Whether `handle` names a live native context.
pub fn is_live_context(handle: usize) -> bool {
    is_live(handle)
}

/// Makes the next owned context created on this thread fail after its native context was
/// allocated, as a driver does when a later setup step goes wrong.
pub fn fail_next_context_creation() {
    let _ = FAIL_NEXT_CREATION.try_with(|fail| fail.set(true));
}

/// The native handle allocated by the last creation that failed on this thread, or 0.
pub fn abandoned_handle() -> usize {
    ABANDONED_HANDLE.try_with(Cell::get).unwrap_or(0)
}
