// portgfx/src/platform/generic/fake/context.rs
//
//! Contexts of the simulated driver.

use crate::context::{Backend, GlContextSpec, NativeContext, ProcAddressFlags};
use crate::proc_address::{self, GLES_SUFFIXES};
use crate::{Error, WindowingApiError};
use super::{driver, gl};

use std::os::raw::c_void;

/// A context of the simulated driver.
pub struct FakeContext {
    handle: usize,
    is_owned: bool,
}

/// The simulated driver backend.
pub struct FakeBackend;

impl FakeBackend {
    fn create_owned(spec: &GlContextSpec, share_with: Option<usize>)
                    -> Result<Box<dyn NativeContext>, Error> {
        if spec.width() <= 0 || spec.height() <= 0 {
            return Err(Error::InvalidBackbufferSize { width: spec.width(), height: spec.height() });
        }
        if spec.native_window.is_some() {
            return Err(Error::IncompatibleNativeWindow);
        }
        spec.warn_if_debug_unsupported("simulated");

        let context = match driver::allocate(share_with) {
            Some(handle) => FakeContext { handle, is_owned: true },
            None => return Err(Error::ContextCreationFailed(WindowingApiError::BadShareContext)),
        };
        // Dropping `context` releases the handle.
        if driver::take_creation_failure() {
            driver::record_abandoned(context.handle);
            return Err(Error::ContextCreationFailed(WindowingApiError::Failed));
        }
        Ok(Box::new(context))
    }
}

impl Backend for FakeBackend {
    fn create_context(spec: &GlContextSpec) -> Result<Box<dyn NativeContext>, Error> {
        FakeBackend::create_owned(spec, None)
    }

    fn create_wrapping_context() -> Result<Box<dyn NativeContext>, Error> {
        match driver::current() {
            0 => Err(Error::NoCurrentContext),
            handle => Ok(Box::new(FakeContext { handle, is_owned: false })),
        }
    }

    #[inline]
    fn current_context_id() -> usize {
        driver::current()
    }
}

impl NativeContext for FakeContext {
    fn is_valid(&self) -> bool {
        self.handle != 0 && driver::is_live(self.handle)
    }

    #[inline]
    fn is_owned(&self) -> bool {
        self.is_owned
    }

    #[inline]
    fn native_handle(&self) -> usize {
        self.handle
    }

    fn get_proc_address(&self, name: &str, _: ProcAddressFlags) -> *const c_void {
        proc_address::with_suffixes(name, GLES_SUFFIXES, gl::lookup)
    }

    fn swap_buffers(&self) {
        driver::record_swap(self.handle)
    }

    fn make_current(&self) -> bool {
        driver::bind(self.handle)
    }

    fn clear_current(&self) {
        driver::bind(0);
    }

    fn cleanup_thread(&self) {
        driver::record_thread_cleanup()
    }

    fn set_swap_interval(&self, interval: i32) -> bool {
        driver::set_swap_interval(driver::current(), interval)
    }

    fn create_in_share_group(&self, spec: &GlContextSpec)
                             -> Result<Box<dyn NativeContext>, Error> {
        FakeBackend::create_owned(spec, Some(self.handle))
    }
}

impl Drop for FakeContext {
    fn drop(&mut self) {
        if self.is_owned {
            driver::release(self.handle);
        }
    }
}
