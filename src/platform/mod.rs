//! Platform-specific backends.
//!
//! `default` is the one backend compiled into this binary. Unit tests and the `fake-default`
//! feature select the simulated driver; the `osmesa-default` feature selects OSMesa where it is
//! available; otherwise the target's native windowing API is used.

pub mod generic;
#[cfg(any(test, fake_default))]
pub use generic::fake as default;
#[cfg(all(osmesa_default, not(any(test, fake_default))))]
pub use generic::osmesa as default;

#[cfg(egl_backend)]
pub mod egl;
#[cfg(all(egl_backend, not(any(test, fake_default, osmesa_default))))]
pub use egl as default;

#[cfg(linux)]
pub mod unix;
#[cfg(all(glx, not(any(test, fake_default, osmesa_default))))]
pub use unix::glx as default;

#[cfg(windows)]
pub mod windows;
#[cfg(all(angle, not(any(test, fake_default))))]
pub use windows::angle as default;
#[cfg(all(wgl, not(any(test, fake_default))))]
pub use windows::wgl as default;

#[cfg(macos)]
pub mod macos;
#[cfg(all(macos, not(any(test, fake_default))))]
pub use macos::cgl as default;

#[cfg(emscripten)]
pub mod emscripten;
#[cfg(all(emscripten, not(any(test, fake_default))))]
pub use emscripten as default;
