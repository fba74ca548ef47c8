// portgfx/src/platform/generic/mod.rs
//
//! Backends that are not specific to any operating system.

#[cfg(any_egl)]
pub(crate) mod egl;

pub mod fake;

#[cfg(osmesa)]
pub mod osmesa;
