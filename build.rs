// portgfx/build.rs
//
//! The `portgfx` build script.

use cfg_aliases::cfg_aliases;
use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};
use std::env;
use std::fs::File;
use std::path::PathBuf;

fn main() {
    // Setup aliases for #[cfg] checks
    cfg_aliases! {
        // Platforms
        windows: { target_os = "windows" },
        macos: { target_os = "macos" },
        android: { target_os = "android" },
        emscripten: { target_os = "emscripten" },
        linux: { all(unix, not(any(macos, android, emscripten))) },

        // Backends:
        // Each alias names a native API that is compiled in for the target. Exactly one of them
        // (or OSMesa, or the simulated driver) is picked as `platform::default`.
        angle: { all(windows, feature = "angle") },
        wgl: { all(windows, not(feature = "angle")) },
        glx: { all(linux, not(feature = "gles")) },
        linux_egl: { all(linux, feature = "gles") },
        egl_backend: { any(android, linux_egl) },
        any_egl: { any(egl_backend, angle, emscripten) },
        osmesa: { all(linux, feature = "osmesa") },
        osmesa_default: { all(osmesa, feature = "osmesa-default") },
        fake_default: { feature = "fake-default" },
    }

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap();
    let target_family = env::var("CARGO_CFG_TARGET_FAMILY").ok();
    let dest = PathBuf::from(&env::var("OUT_DIR").unwrap());

    // Generate EGL bindings.
    let is_linux = target_family.as_ref().map_or(false, |f| f == "unix")
        && !["macos", "android", "emscripten"].contains(&target_os.as_str());
    if target_os == "android"
        || target_os == "emscripten"
        || (target_os == "windows" && cfg!(feature = "angle"))
        || (is_linux && cfg!(feature = "gles"))
    {
        let mut file = File::create(&dest.join("egl_bindings.rs")).unwrap();
        let registry = Registry::new(Api::Egl, (1, 5), Profile::Core, Fallbacks::All, []);
        registry.write_bindings(StructGenerator, &mut file).unwrap();
    }
}
