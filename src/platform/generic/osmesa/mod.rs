// portgfx/src/platform/generic/osmesa/mod.rs
//
//! Software rendering through Mesa's off-screen interface.
//!
//! Available on Linux with the `osmesa` feature. It becomes the default backend with
//! `osmesa-default`, which is useful on machines with no display server at all.

mod context;

pub use self::context::{OsMesaBackend, OsMesaContext};
pub use self::context::OsMesaBackend as NativeBackend;
