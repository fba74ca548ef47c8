// portgfx/src/library.rs
//
//! Run-time loading of the system graphics libraries.

use std::ffi::{CStr, CString};
use std::os::raw::c_void;
#[cfg(any(unix, any_egl))]
use std::ptr;

#[cfg(unix)]
use libc::{RTLD_LAZY, RTLD_NOW, dlopen, dlsym};
#[cfg(windows)]
use winapi::shared::minwindef::HMODULE;
#[cfg(windows)]
use winapi::um::libloaderapi;

/// A shared library that stays loaded for the lifetime of the process.
pub(crate) struct Library {
    handle: *mut c_void,
}

// Library handles are process-global and never closed.
unsafe impl Send for Library {}
unsafe impl Sync for Library {}

impl Library {
    /// Opens the first of `names` that loads.
    pub(crate) fn open(names: &[&str]) -> Option<Library> {
        names.iter().filter_map(|name| Library::open_one(name)).next()
    }

    #[cfg(unix)]
    fn open_one(name: &str) -> Option<Library> {
        let name = CString::new(name).ok()?;
        let handle = unsafe { dlopen(name.as_ptr(), RTLD_NOW) };
        if handle.is_null() {
            debug!("Failed to load {:?}", name);
            return None;
        }
        Some(Library { handle })
    }

    #[cfg(windows)]
    fn open_one(name: &str) -> Option<Library> {
        let name = CString::new(name).ok()?;
        let handle = unsafe { libloaderapi::LoadLibraryA(name.as_ptr()) };
        if handle.is_null() {
            debug!("Failed to load {:?}", name);
            return None;
        }
        Some(Library { handle: handle as *mut c_void })
    }

    /// The executable image together with every library it has loaded.
    #[cfg(unix)]
    pub(crate) fn process() -> Option<Library> {
        let handle = unsafe { dlopen(ptr::null(), RTLD_LAZY) };
        if handle.is_null() {
            return None;
        }
        Some(Library { handle })
    }

    #[cfg(unix)]
    pub(crate) fn symbol(&self, name: &CStr) -> *const c_void {
        unsafe { dlsym(self.handle, name.as_ptr()) as *const c_void }
    }

    #[cfg(windows)]
    pub(crate) fn symbol(&self, name: &CStr) -> *const c_void {
        unsafe {
            libloaderapi::GetProcAddress(self.handle as HMODULE, name.as_ptr()) as *const c_void
        }
    }

    /// Like `symbol`, for names that aren't already C strings. Returns null for names with an
    /// interior NUL.
    #[cfg(any_egl)]
    pub(crate) fn symbol_str(&self, name: &str) -> *const c_void {
        match CString::new(name) {
            Ok(name) => self.symbol(&name),
            Err(_) => ptr::null(),
        }
    }
}
