//! Process-wide bookkeeping of `GlContext` objects.
//!
//! Two tables live here:
//!
//! * a map from native handle to a weak reference, so that a native context observed as current
//!   is wrapped by at most one `GlContext` at a time;
//! * a per-thread slot holding the `GlContext` current on that thread.
//!
//! The per-thread slot holds a strong reference: a context that is current on some thread stays
//! alive even after every other handle has been dropped. The slot is released by
//! `GlContext::make_current`, `GlContext::cleanup_thread` or, as a last resort, thread exit.

use crate::gl_context::{GlContext, GlContextPtr};

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

lazy_static! {
    static ref CONTEXTS: Mutex<HashMap<usize, Weak<GlContext>>> = Mutex::new(HashMap::new());
}

thread_local! {
    static CURRENT: RefCell<CurrentBinding> = RefCell::new(CurrentBinding(None));
}

// Initialized on first use by each thread.
struct CurrentBinding(Option<GlContextPtr>);

fn contexts() -> MutexGuard<'static, HashMap<usize, Weak<GlContext>>> {
    CONTEXTS.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn register(context: &GlContextPtr) {
    let gl_context_id = context.gl_context_id();
    if gl_context_id == 0 {
        return;
    }
    let previous = contexts().insert(gl_context_id, Arc::downgrade(context));
    if previous.map_or(false, |previous| previous.strong_count() > 0) {
        info!("Overwriting GlContext for GL context ID {:#x}", gl_context_id);
    }
}

pub(crate) fn find(gl_context_id: usize) -> Option<GlContextPtr> {
    contexts().get(&gl_context_id).and_then(Weak::upgrade)
}

// Only removes the entry if it still refers to `context`; a newer wrapper may have replaced it.
pub(crate) fn unregister(gl_context_id: usize, context: *const GlContext) {
    let mut contexts = contexts();
    let is_same = contexts.get(&gl_context_id).map_or(false, |weak| weak.as_ptr() == context);
    if is_same {
        contexts.remove(&gl_context_id);
    }
}

pub(crate) fn thread_current() -> Option<GlContextPtr> {
    CURRENT.try_with(|current| current.borrow().0.clone()).ok().flatten()
}

/// Replaces the calling thread's binding.
///
/// The previous binding is dropped after the slot is released, so that destroying a context never
/// happens while the slot is borrowed.
pub(crate) fn set_thread_current(context: Option<GlContextPtr>) {
    let previous = CURRENT.try_with(|current| current.replace(CurrentBinding(context)));
    drop(previous);
}

