// portgfx/src/platform/unix/mod.rs
//
//! Backends specific to Unix-like systems, particularly Linux.

#[cfg(glx)]
pub mod glx;
