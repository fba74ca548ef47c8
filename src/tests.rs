// portgfx/src/tests.rs
//
//! Unit tests.
//!
//! These run against the simulated driver, so every native context here is created by
//! `platform::generic::fake`.

use crate::platform::generic::fake;
use crate::{CurrentContextGuard, GlContext, GlContextSpec, ProcAddressFlags};
use crate::{is_extension_supported_in_current_context, set_swap_interval};
use self::log_checker::LogChecker;

use log::Level;
use std::sync::Arc;
use std::thread;

pub(crate) mod log_checker {
    //! Captures log records emitted on the current thread.

    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::cell::RefCell;
    use std::marker::PhantomData;
    use std::sync::Once;

    thread_local! {
        static RECORDS: RefCell<Option<Vec<(Level, String)>>> = RefCell::new(None);
    }

    static INSTALL_LOGGER: Once = Once::new();
    static LOGGER: ThreadLogger = ThreadLogger;

    struct ThreadLogger;

    impl Log for ThreadLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            let _ = RECORDS.try_with(|records| {
                if let Some(ref mut records) = *records.borrow_mut() {
                    records.push((record.level(), record.args().to_string()));
                }
            });
        }

        fn flush(&self) {}
    }

    /// Records every message logged on this thread while it is alive.
    pub(crate) struct LogChecker {
        phantom: PhantomData<*const ()>,
    }

    impl LogChecker {
        pub(crate) fn new() -> LogChecker {
            INSTALL_LOGGER.call_once(|| {
                if log::set_logger(&LOGGER).is_ok() {
                    log::set_max_level(LevelFilter::Trace);
                }
            });
            RECORDS.with(|records| *records.borrow_mut() = Some(vec![]));
            LogChecker { phantom: PhantomData }
        }

        pub(crate) fn has_message(&self, level: Level, text: &str) -> bool {
            RECORDS.with(|records| {
                records.borrow().as_ref().map_or(false, |records| {
                    records.iter().any(|&(record_level, ref message)| {
                        record_level == level && message.contains(text)
                    })
                })
            })
        }

        pub(crate) fn has_any_messages(&self) -> bool {
            RECORDS.with(|records| records.borrow().as_ref().map_or(false, |r| !r.is_empty()))
        }

        pub(crate) fn clear(&self) {
            RECORDS.with(|records| {
                if let Some(ref mut records) = *records.borrow_mut() {
                    records.clear();
                }
            })
        }
    }

    impl Drop for LogChecker {
        fn drop(&mut self) {
            let _ = RECORDS.try_with(|records| *records.borrow_mut() = None);
        }
    }
}

fn spec() -> GlContextSpec {
    GlContextSpec::default()
}

#[test]
fn test_nothing_current_initially() {
    assert!(GlContext::current().is_none());
    assert!(GlContext::get_current(true).is_none());
    assert_eq!(GlContext::current_id(), 0);
    assert_eq!(GlContext::current_gl_context_id(), 0);
}

#[test]
fn test_context_ids_and_share_groups() {
    let context = GlContext::create(&spec()).unwrap();
    assert!(context.is_valid());
    assert!(context.is_owned());
    assert_ne!(context.id(), 0);
    assert_ne!(context.share_group_id(), 0);
    assert_ne!(context.gl_context_id(), 0);

    assert!(GlContext::make_current(Some(&context)));
    let id = GlContext::current_id();
    let share_group_id = context.share_group_id();
    assert_eq!(id, context.id());
    assert!(Arc::ptr_eq(&context, &GlContext::current().unwrap()));

    // A plain context gets its own share group and doesn't become current.
    let unshared = GlContext::create(&spec()).unwrap();
    assert_ne!(unshared.id(), id);
    assert_ne!(unshared.share_group_id(), share_group_id);
    assert_ne!(unshared.share_group_id(), 0);
    assert_eq!(GlContext::current_id(), id);

    // Sharing with the current context.
    let shared = GlContext::create_in_current_share_group(&spec()).unwrap();
    assert_eq!(GlContext::current_id(), id);
    assert_ne!(shared.id(), id);
    assert_eq!(shared.share_group_id(), share_group_id);

    assert!(GlContext::make_current(Some(&shared)));
    assert_eq!(GlContext::current_id(), shared.id());
    let shared2 = GlContext::create_in_current_share_group(&spec()).unwrap();
    assert_eq!(shared2.share_group_id(), share_group_id);
    assert_eq!(GlContext::current_id(), shared.id());

    assert!(GlContext::make_current(None));
}

#[test]
fn test_ids_unique_across_many_contexts() {
    let contexts: Vec<_> = (0..16).map(|_| GlContext::create(&spec()).unwrap()).collect();
    for (index, context) in contexts.iter().enumerate() {
        for other in &contexts[(index + 1)..] {
            assert_ne!(context.id(), other.id());
            assert_ne!(context.share_group_id(), other.share_group_id());
            assert_ne!(context.gl_context_id(), other.gl_context_id());
        }
    }
}

#[test]
fn test_share_group_objects_are_visible() {
    let context = GlContext::create(&spec()).unwrap();
    assert!(GlContext::make_current(Some(&context)));
    assert!(context.does_current_context_match());

    let shared = GlContext::create_in_current_share_group(&spec()).unwrap();
    let unshared = GlContext::create(&spec()).unwrap();

    // Shared contexts see each other's stamps.
    assert!(GlContext::make_current(Some(&shared)));
    assert!(context.does_current_context_match());
    assert!(shared.does_current_context_match());

    // An unshared context sees neither.
    assert!(GlContext::make_current(Some(&unshared)));
    assert!(unshared.does_current_context_match());
    assert!(!shared.does_current_context_match());
    assert!(!context.does_current_context_match());

    assert!(GlContext::make_current(None));
}

#[test]
fn test_clearing_is_idempotent() {
    let context = GlContext::create(&spec()).unwrap();
    assert!(GlContext::make_current(Some(&context)));
    assert!(GlContext::make_current(None));
    assert!(GlContext::current().is_none());
    assert_eq!(GlContext::current_id(), 0);
    assert!(GlContext::make_current(None));
    assert!(GlContext::current().is_none());
    assert_eq!(GlContext::current_id(), 0);
}

#[test]
fn test_make_current_same_context_twice() {
    let context = GlContext::create(&spec()).unwrap();
    assert!(GlContext::make_current(Some(&context)));
    assert!(GlContext::make_current(Some(&context)));
    assert_eq!(GlContext::current_id(), context.id());
    assert_eq!(GlContext::current_gl_context_id(), context.gl_context_id());
    assert!(GlContext::make_current(None));
}

#[test]
fn test_create_in_share_group_requires_current_context() {
    let log_checker = LogChecker::new();
    assert!(GlContext::create_in_current_share_group(&spec()).is_none());
    assert!(log_checker.has_message(Level::Error, "no context is current"));
}

#[test]
fn test_creation_failure_returns_none() {
    let log_checker = LogChecker::new();
    assert!(GlContext::create(&GlContextSpec::new(0, 16)).is_none());
    assert!(log_checker.has_message(Level::Error, "Failed to create GL context"));
    assert!(GlContext::current().is_none());
}

#[test]
fn test_failed_creation_releases_native_context() {
    let log_checker = LogChecker::new();
    fake::fail_next_context_creation();
    assert!(GlContext::create(&spec()).is_none());
    assert!(log_checker.has_message(Level::Error, "Failed to create GL context"));

    let abandoned = fake::abandoned_handle();
    assert_ne!(abandoned, 0);
    assert!(!fake::is_live_context(abandoned));
    assert_eq!(GlContext::current_gl_context_id(), 0);

    // The handle went back to the free list, and the request only affected one creation.
    let next = GlContext::create(&spec()).unwrap();
    assert_eq!(next.gl_context_id(), abandoned);
}

#[test]
fn test_failed_share_group_creation_releases_native_context() {
    let context = GlContext::create(&spec()).unwrap();
    assert!(GlContext::make_current(Some(&context)));
    fake::fail_next_context_creation();
    assert!(GlContext::create_in_current_share_group(&spec()).is_none());
    assert!(!fake::is_live_context(fake::abandoned_handle()));
    assert_eq!(GlContext::current_id(), context.id());
    assert!(GlContext::make_current(None));
}

#[test]
fn test_debug_context_request_is_degraded() {
    let log_checker = LogChecker::new();
    let spec = GlContextSpec { debug_context_enabled: true, ..GlContextSpec::new(64, 64) };
    let context = GlContext::create(&spec).unwrap();
    assert!(context.is_valid());
    assert!(log_checker.has_message(Level::Warn, "Debug contexts are not supported"));
    assert!(!log_checker.has_message(Level::Error, ""));
}

#[test]
fn test_owned_context_released_with_last_handle() {
    let context = GlContext::create(&spec()).unwrap();
    let handle = context.gl_context_id();
    assert!(fake::is_live_context(handle));
    drop(context);
    assert!(!fake::is_live_context(handle));

    // The driver reuses the handle for the next context created on this thread.
    let next = GlContext::create(&spec()).unwrap();
    assert_eq!(next.gl_context_id(), handle);
    assert!(GlContext::make_current(Some(&next)));
    assert_eq!(GlContext::current_id(), next.id());
    assert!(GlContext::make_current(None));
}

#[test]
fn test_current_binding_keeps_context_alive() {
    let context = GlContext::create(&GlContextSpec::new(64, 64)).unwrap();
    let id = context.id();
    let handle = context.gl_context_id();
    assert!(GlContext::make_current(Some(&context)));
    drop(context);

    assert!(fake::is_live_context(handle));
    assert_eq!(GlContext::current_id(), id);
    assert!(GlContext::current().unwrap().is_valid());

    assert!(GlContext::make_current(None));
    assert!(!fake::is_live_context(handle));
}

#[test]
fn test_wrapping_external_context() {
    let handle = fake::create_external_context();
    assert!(GlContext::create_wrapping().is_none());

    assert!(fake::make_external_current(handle));
    let wrapper = GlContext::current().unwrap();
    assert!(!wrapper.is_owned());
    assert_eq!(wrapper.gl_context_id(), handle);
    assert!(Arc::ptr_eq(&wrapper, &GlContext::current().unwrap()));
    assert_eq!(GlContext::current_id(), wrapper.id());

    // Wrappers may be moved into a share group, owned contexts may not.
    let log_checker = LogChecker::new();
    wrapper.set_share_group_id(1234);
    assert_eq!(wrapper.share_group_id(), 1234);
    assert!(!log_checker.has_any_messages());

    let owned = GlContext::create(&spec()).unwrap();
    let share_group_id = owned.share_group_id();
    owned.set_share_group_id(1234);
    assert_eq!(owned.share_group_id(), share_group_id);
    assert!(log_checker.has_message(Level::Error, "owned GlContext"));

    // Dropping a wrapper never destroys the native context.
    assert!(GlContext::make_current(None));
    drop(wrapper);
    assert!(fake::is_live_context(handle));
    fake::destroy_external_context(handle);
}

#[test]
fn test_external_shared_context_wraps_separately() {
    let handle = fake::create_external_context();
    let shared_handle = fake::create_external_shared_context(handle);
    assert_ne!(shared_handle, 0);

    assert!(fake::make_external_current(handle));
    let first = GlContext::current().unwrap();
    assert!(fake::make_external_current(shared_handle));
    let second = GlContext::current().unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(second.gl_context_id(), shared_handle);

    // Returning to the first native context finds the first wrapper again.
    assert!(fake::make_external_current(handle));
    assert!(Arc::ptr_eq(&first, &GlContext::get_current(true).unwrap()));

    assert!(GlContext::make_current(None));
    fake::destroy_external_context(shared_handle);
    fake::destroy_external_context(handle);
}

#[test]
fn test_stamp_detects_handle_reuse() {
    let log_checker = LogChecker::new();
    let handle = fake::create_external_context();
    assert!(fake::make_external_current(handle));
    let first = GlContext::get_current(true).unwrap();
    assert!(first.does_current_context_match());

    // The external code destroys its context and creates another that gets the same handle.
    assert!(fake::make_external_current(0));
    fake::destroy_external_context(handle);
    let reused = fake::create_external_context();
    assert_eq!(reused, handle);
    assert!(fake::make_external_current(reused));
    assert!(!first.does_current_context_match());

    let second = GlContext::get_current(true).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(second.gl_context_id(), reused);
    assert_eq!(first.gl_context_id(), 0);
    assert!(second.does_current_context_match());
    assert!(log_checker.has_message(Level::Info, "Overwriting GlContext"));

    // The stale wrapper can't be made current any more.
    assert!(!GlContext::make_current(Some(&first)));
    assert!(log_checker.has_message(Level::Error, "Failed to make context current."));

    assert!(GlContext::make_current(Some(&second)));
    assert!(GlContext::make_current(None));
    fake::destroy_external_context(reused);
}

#[test]
fn test_handle_reuse_is_trusted_without_stamp_check() {
    let handle = fake::create_external_context();
    assert!(fake::make_external_current(handle));
    let first = GlContext::current().unwrap();

    assert!(fake::make_external_current(0));
    fake::destroy_external_context(handle);
    let reused = fake::create_external_context();
    assert_eq!(reused, handle);
    assert!(fake::make_external_current(reused));

    // The cheap lookup only compares handles, so it returns the stale wrapper.
    assert!(Arc::ptr_eq(&first, &GlContext::current().unwrap()));
    // Asking for the stamp check catches it.
    let checked = GlContext::get_current(true).unwrap();
    assert!(!Arc::ptr_eq(&first, &checked));

    assert!(GlContext::make_current(None));
    fake::destroy_external_context(reused);
}

#[test]
fn test_make_current_fails_for_destroyed_native_context() {
    let handle = fake::create_external_context();
    assert!(fake::make_external_current(handle));
    let wrapper = GlContext::current().unwrap();
    assert!(fake::make_external_current(0));
    fake::destroy_external_context(handle);
    assert!(!wrapper.is_valid());

    let log_checker = LogChecker::new();
    assert!(!GlContext::make_current(Some(&wrapper)));
    assert!(log_checker.has_message(Level::Error, "Failed to make context current."));
    assert!(GlContext::current().is_none());
    assert_eq!(GlContext::current_id(), 0);
}

#[test]
fn test_cleanup_thread() {
    let context = GlContext::create(&spec()).unwrap();
    let shared = {
        assert!(GlContext::make_current(Some(&context)));
        GlContext::create_in_current_share_group(&spec()).unwrap()
    };
    assert!(GlContext::make_current(Some(&shared)));
    let cleanups = fake::thread_cleanup_count();

    GlContext::cleanup_thread();
    assert!(GlContext::current().is_none());
    assert_ne!(GlContext::current_id(), shared.id());
    assert_eq!(fake::thread_cleanup_count(), cleanups + 1);

    // The context can be reattached.
    assert!(GlContext::make_current(Some(&shared)));
    assert_eq!(GlContext::current_id(), shared.id());
    assert_eq!(shared.share_group_id(), context.share_group_id());

    GlContext::cleanup_thread();
    GlContext::cleanup_thread();
    assert_eq!(fake::thread_cleanup_count(), cleanups + 2);
}

#[test]
fn test_get_proc_address() {
    let context = GlContext::create(&GlContextSpec::new(64, 64)).unwrap();
    assert!(GlContext::make_current(Some(&context)));

    for &flags in &[ProcAddressFlags::CORE,
                    ProcAddressFlags::CORE | ProcAddressFlags::PURE,
                    ProcAddressFlags::empty()] {
        assert!(!context.get_proc_address("glClear", flags).is_null());
        assert!(!context.get_proc_address("glGetString", flags).is_null());
        // Only exported with a suffix.
        assert!(!context.get_proc_address("glBindVertexArray", flags).is_null());
        assert!(!context.get_proc_address("glDiscardFramebuffer", flags).is_null());
        assert!(context.get_proc_address("NoSuchFunction", flags).is_null());
        assert!(context.get_proc_address("", flags).is_null());
    }

    assert!(GlContext::make_current(None));
}

#[test]
fn test_swap_buffers() {
    let context = GlContext::create(&spec()).unwrap();
    let handle = context.gl_context_id();
    assert!(GlContext::make_current(Some(&context)));
    context.swap_buffers();
    context.swap_buffers();
    assert_eq!(fake::swap_count(handle), Some(2));
    assert!(GlContext::make_current(None));
}

#[test]
fn test_set_swap_interval() {
    assert!(!set_swap_interval(1));

    let context = GlContext::create(&spec()).unwrap();
    let handle = context.gl_context_id();
    assert!(GlContext::make_current(Some(&context)));
    assert!(!set_swap_interval(-1));
    assert_eq!(fake::swap_interval(handle), Some(1));
    assert!(set_swap_interval(0));
    assert_eq!(fake::swap_interval(handle), Some(0));
    assert!(set_swap_interval(2));
    assert_eq!(fake::swap_interval(handle), Some(2));
    assert!(GlContext::make_current(None));
}

#[test]
fn test_extension_support_in_current_context() {
    let log_checker = LogChecker::new();
    assert!(!is_extension_supported_in_current_context("vertex_array_object"));
    assert!(log_checker.has_message(Level::Warn, "there is no OpenGL context"));

    let context = GlContext::create(&spec()).unwrap();
    assert!(GlContext::make_current(Some(&context)));
    assert!(is_extension_supported_in_current_context("vertex_array_object"));
    assert!(is_extension_supported_in_current_context("debug_marker"));
    assert!(!is_extension_supported_in_current_context("texture_float"));
    assert!(GlContext::make_current(None));
}

#[test]
fn test_current_context_guard() {
    let outer = GlContext::create(&spec()).unwrap();
    let inner = GlContext::create(&spec()).unwrap();
    assert!(GlContext::make_current(Some(&outer)));
    {
        let _guard = CurrentContextGuard::make_current(&inner).unwrap();
        assert_eq!(GlContext::current_id(), inner.id());
    }
    assert_eq!(GlContext::current_id(), outer.id());

    assert!(GlContext::make_current(None));
    {
        let _guard = CurrentContextGuard::make_current(&inner).unwrap();
        assert_eq!(GlContext::current_id(), inner.id());
    }
    assert_eq!(GlContext::current_id(), 0);
}

#[test]
fn test_current_context_guard_for_unusable_context() {
    let outer = GlContext::create(&spec()).unwrap();
    let handle = fake::create_external_context();
    assert!(fake::make_external_current(handle));
    let wrapper = GlContext::current().unwrap();
    assert!(GlContext::make_current(Some(&outer)));
    fake::destroy_external_context(handle);

    let log_checker = LogChecker::new();
    assert!(CurrentContextGuard::make_current(&wrapper).is_none());
    assert!(log_checker.has_message(Level::Error, "Failed to make context current."));
    assert_eq!(GlContext::current_id(), outer.id());
    assert_eq!(GlContext::current_gl_context_id(), outer.gl_context_id());
    assert!(GlContext::make_current(None));
}

#[test]
fn test_refresh_current() {
    GlContext::refresh_current();
    let context = GlContext::create(&spec()).unwrap();
    assert!(GlContext::make_current(Some(&context)));
    GlContext::refresh_current();
    assert_eq!(GlContext::current_id(), context.id());
    assert!(GlContext::make_current(None));
}

#[test]
fn test_current_context_is_per_thread() {
    let context = GlContext::create(&spec()).unwrap();
    let other = GlContext::create(&spec()).unwrap();
    let other_id = other.id();
    assert!(GlContext::make_current(Some(&context)));

    let seen = thread::spawn(move || {
        assert_eq!(GlContext::current_id(), 0);
        assert!(GlContext::make_current(Some(&other)));
        let seen = GlContext::current_id();
        GlContext::cleanup_thread();
        assert_eq!(GlContext::current_id(), 0);
        seen
    }).join().unwrap();

    assert_eq!(seen, other_id);
    assert_eq!(GlContext::current_id(), context.id());
    assert!(GlContext::make_current(None));
}

#[test]
fn test_context_current_on_exiting_thread_is_released() {
    let context = GlContext::create(&spec()).unwrap();
    let handle = context.gl_context_id();
    thread::spawn(move || {
        assert!(GlContext::make_current(Some(&context)));
        drop(context);
        assert!(fake::is_live_context(handle));
    }).join().unwrap();
    assert!(!fake::is_live_context(handle));
}

#[test]
fn test_context_shared_between_threads() {
    let context = GlContext::create(&spec()).unwrap();
    let threads: Vec<_> = (0..4).map(|_| {
        let context = context.clone();
        thread::spawn(move || {
            assert!(GlContext::make_current(Some(&context)));
            let id = GlContext::current_id();
            assert!(GlContext::make_current(None));
            id
        })
    }).collect();
    for thread in threads {
        assert_eq!(thread.join().unwrap(), context.id());
    }
}

#[test]
fn test_log_checker_clear() {
    let log_checker = LogChecker::new();
    warn!("something odd");
    assert!(log_checker.has_message(Level::Warn, "odd"));
    log_checker.clear();
    assert!(!log_checker.has_any_messages());
}
