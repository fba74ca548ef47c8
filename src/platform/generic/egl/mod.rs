// portgfx/src/platform/generic/egl/mod.rs
//
//! Functionality common to EGL-based backends.

pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod library;
