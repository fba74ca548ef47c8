// portgfx/src/error.rs
//
//! Various errors that backends can produce.
//!
//! None of these reach callers of the public factories: [`crate::GlContext::create`] and friends
//! log the error and return `None`.

use std::fmt::{self, Display, Formatter};

/// Various errors that backends can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The method failed for a miscellaneous reason.
    Failed,
    /// The platform doesn't support this method.
    UnsupportedOnThisPlatform,
    /// The system OpenGL library couldn't be located.
    NoGLLibraryFound,
    /// Some of the dynamically loaded entry points could not be resolved.
    MissingEntryPoints(Vec<&'static str>),
    /// A connection to the display server could not be opened.
    ConnectionFailed,
    /// The windowing API could not be initialized on the display.
    InitializationFailed(WindowingApiError),
    /// The windowing API is older than the minimum supported version.
    UnsupportedVersion { major: i32, minor: i32 },
    /// Choosing an OpenGL pixel format failed.
    PixelFormatSelectionFailed(WindowingApiError),
    /// The system couldn't choose an OpenGL pixel format.
    NoPixelFormatFound,
    /// The system couldn't create a window or surface to render into.
    SurfaceCreationFailed(WindowingApiError),
    /// The system couldn't create an OpenGL context.
    ContextCreationFailed(WindowingApiError),
    /// The system couldn't make the OpenGL context current or not current.
    MakeCurrentFailed(WindowingApiError),
    /// An extension necessary for this operation isn't supported.
    RequiredExtensionUnavailable,
    /// There is no native context current on this thread.
    NoCurrentContext,
    /// The requested backbuffer size can't be honored by this backend.
    InvalidBackbufferSize { width: i32, height: i32 },
    /// The native window handle is of a kind this backend can't render into.
    IncompatibleNativeWindow,
}

/// Abstraction of the errors that EGL, GLX, WGL, CGL, etc. return.
///
/// They all tend to follow similar patterns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowingApiError {
    /// Miscellaneous error.
    Failed,
    /// An unrecognized attribute or attribute value was passed in the attribute list.
    BadAttribute,
    /// An invalid context argument.
    BadContext,
    /// Invalid display.
    BadDisplay,
    /// Arguments are inconsistent.
    BadMatch,
    /// Resources for the requested operation couldn't be allocated.
    BadAlloc,
    /// EGL is not initialized, or could not be initialized, for the display.
    NotInitialized,
    /// A requested resource can't be accessed (for example a context is bound in another thread).
    BadAccess,
    /// The current surface of the calling thread is no longer valid.
    BadCurrentSurface,
    /// A surface argument does not name a valid surface.
    BadSurface,
    /// One or more argument values are invalid.
    BadParameter,
    /// A native pixmap argument does not refer to a valid native pixmap.
    BadNativePixmap,
    /// A native window argument does not refer to a valid native window.
    BadNativeWindow,
    /// A power management event has occurred and the context was lost.
    ContextLost,
    /// The configuration is unsupported.
    BadConfig,
    /// Invalid pixel format object.
    BadPixelFormat,
    /// Invalid share context.
    BadShareContext,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Error::Failed => f.write_str("operation failed"),
            Error::UnsupportedOnThisPlatform => f.write_str("unsupported on this platform"),
            Error::NoGLLibraryFound => f.write_str("no GL library found"),
            Error::MissingEntryPoints(ref names) => {
                write!(f, "missing X11/GLX entry points: {}", names.join(" "))
            }
            Error::ConnectionFailed => f.write_str("failed to connect to the display"),
            Error::InitializationFailed(err) => write!(f, "failed to initialize display: {:?}", err),
            Error::UnsupportedVersion { major, minor } => {
                write!(f, "windowing API version {}.{} is too old", major, minor)
            }
            Error::PixelFormatSelectionFailed(err) => {
                write!(f, "failed to choose a pixel format: {:?}", err)
            }
            Error::NoPixelFormatFound => f.write_str("no suitable pixel format found"),
            Error::SurfaceCreationFailed(err) => write!(f, "failed to create surface: {:?}", err),
            Error::ContextCreationFailed(err) => write!(f, "failed to create context: {:?}", err),
            Error::MakeCurrentFailed(err) => write!(f, "failed to make context current: {:?}", err),
            Error::RequiredExtensionUnavailable => f.write_str("required extension unavailable"),
            Error::NoCurrentContext => f.write_str("no context is current"),
            Error::InvalidBackbufferSize { width, height } => {
                write!(f, "unsupported backbuffer size {}x{}", width, height)
            }
            Error::IncompatibleNativeWindow => f.write_str("incompatible native window handle"),
        }
    }
}

impl std::error::Error for Error {}
