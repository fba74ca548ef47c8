// portgfx/src/platform/macos/cgl/error.rs
//
//! Translation of CGL error codes.

use crate::WindowingApiError;

use cgl::CGLError;

pub(crate) trait ToWindowingApiError {
    fn to_windowing_api_error(self) -> WindowingApiError;
}

impl ToWindowingApiError for CGLError {
    fn to_windowing_api_error(self) -> WindowingApiError {
        match self {
            10000 => WindowingApiError::BadAttribute,
            10002 => WindowingApiError::BadPixelFormat,
            10004 => WindowingApiError::BadContext,
            10005 => WindowingApiError::BadSurface,
            10006 => WindowingApiError::BadDisplay,
            10009 => WindowingApiError::BadMatch,
            10013 => WindowingApiError::BadNativeWindow,
            10016 => WindowingApiError::BadAlloc,
            _ => WindowingApiError::Failed,
        }
    }
}
