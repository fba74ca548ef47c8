// portgfx/src/platform/generic/fake/mod.rs
//
//! A simulated GL driver.
//!
//! Nothing is rendered. The driver keeps just enough state (live handles, per-thread bindings,
//! shader objects per share group) to exercise the context bookkeeping without a GPU. Unit tests
//! always run against it; other builds select it with the `fake-default` feature.

mod context;
mod driver;
mod gl;

pub use self::context::{FakeBackend, FakeContext};
pub use self::context::FakeBackend as NativeBackend;
pub use self::driver::{abandoned_handle, fail_next_context_creation};
pub use self::driver::{create_external_context, create_external_shared_context};
pub use self::driver::{destroy_external_context, is_live_context, make_external_current};
pub use self::driver::{swap_count, swap_interval, thread_cleanup_count};
