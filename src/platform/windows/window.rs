// portgfx/src/platform/windows/window.rs
//
//! A hidden Win32 window whose device context backs offscreen WGL and ANGLE contexts.

use crate::{Error, WindowingApiError};

use std::mem;
use std::ptr;
use std::sync::Once;
use winapi::shared::minwindef::FALSE;
use winapi::shared::ntdef::LPCSTR;
use winapi::shared::windef::{HBRUSH, HDC, HWND};
use winapi::um::libloaderapi;
use winapi::um::wingdi::{self, PFD_DRAW_TO_WINDOW, PFD_MAIN_PLANE, PFD_SUPPORT_OPENGL};
use winapi::um::wingdi::{PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR};
use winapi::um::winuser::{self, COLOR_BACKGROUND, CS_OWNDC, WNDCLASSA, WS_OVERLAPPEDWINDOW};

const WINDOW_CLASS_NAME: &[u8] = b"ION\0";

const COLOR_BITS: u8 = 24;
const ALPHA_BITS: u8 = 8;
const DEPTH_BITS: u8 = 8;

static REGISTER_WINDOW_CLASS: Once = Once::new();

/// A hidden window and its device context.
///
/// The window class has `CS_OWNDC`, so the device context belongs to the window and is released
/// by destroying it.
pub(crate) struct Win32Window {
    window: HWND,
    dc: HDC,
}

impl Win32Window {
    /// Creates a hidden window of the given size and selects an OpenGL pixel format into its DC.
    pub(crate) fn new(width: i32, height: i32) -> Result<Win32Window, Error> {
        unsafe {
            let instance = libloaderapi::GetModuleHandleA(ptr::null());
            let class_name = WINDOW_CLASS_NAME.as_ptr() as LPCSTR;
            REGISTER_WINDOW_CLASS.call_once(|| {
                let window_class = WNDCLASSA {
                    style: CS_OWNDC,
                    lpfnWndProc: Some(winuser::DefWindowProcA),
                    cbClsExtra: 0,
                    cbWndExtra: 0,
                    hInstance: instance,
                    hIcon: ptr::null_mut(),
                    hCursor: ptr::null_mut(),
                    hbrBackground: COLOR_BACKGROUND as HBRUSH,
                    lpszMenuName: ptr::null(),
                    lpszClassName: class_name,
                };
                if winuser::RegisterClassA(&window_class) == 0 {
                    error!("Failed to register window class ION");
                }
            });

            let window = winuser::CreateWindowExA(0,
                                                  class_name,
                                                  class_name,
                                                  WS_OVERLAPPEDWINDOW,
                                                  0,
                                                  0,
                                                  width.max(1),
                                                  height.max(1),
                                                  ptr::null_mut(),
                                                  ptr::null_mut(),
                                                  instance,
                                                  ptr::null_mut());
            if window.is_null() {
                error!("Failed to create window.");
                return Err(Error::SurfaceCreationFailed(WindowingApiError::Failed));
            }
            let mut result = Win32Window { window, dc: ptr::null_mut() };

            result.dc = winuser::GetDC(window);
            if result.dc.is_null() {
                error!("Failed to get device context.");
                return Err(Error::SurfaceCreationFailed(WindowingApiError::Failed));
            }

            let mut pixel_format_descriptor: PIXELFORMATDESCRIPTOR = mem::zeroed();
            pixel_format_descriptor.nSize = mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16;
            pixel_format_descriptor.nVersion = 1;
            pixel_format_descriptor.dwFlags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL;
            pixel_format_descriptor.iPixelType = PFD_TYPE_RGBA;
            pixel_format_descriptor.cColorBits = COLOR_BITS;
            pixel_format_descriptor.cAlphaBits = ALPHA_BITS;
            pixel_format_descriptor.cDepthBits = DEPTH_BITS;
            pixel_format_descriptor.iLayerType = PFD_MAIN_PLANE;

            let pixel_format = wingdi::ChoosePixelFormat(result.dc, &pixel_format_descriptor);
            if pixel_format == 0 {
                error!("Failed to choose pixel format.");
                return Err(Error::NoPixelFormatFound);
            }
            if wingdi::SetPixelFormat(result.dc, pixel_format, &pixel_format_descriptor) == FALSE {
                error!("Failed to set pixel format.");
                return Err(Error::PixelFormatSelectionFailed(WindowingApiError::BadPixelFormat));
            }

            Ok(result)
        }
    }

    #[inline]
    pub(crate) fn window(&self) -> HWND {
        self.window
    }

    #[inline]
    pub(crate) fn dc(&self) -> HDC {
        self.dc
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        unsafe {
            if !self.window.is_null() {
                winuser::DestroyWindow(self.window);
                self.window = ptr::null_mut();
                self.dc = ptr::null_mut();
            }
        }
    }
}
