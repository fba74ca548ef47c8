// portgfx/src/platform/generic/fake/gl.rs
//
//! GL entry points of the simulated driver.
//!
//! Only the functions this crate and its tests touch are provided. A few exist solely under a
//! suffixed name, the way extension functions do on real drivers.

use super::driver;

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_void};
use std::ptr;
use std::slice;

const GL_FALSE: c_uchar = 0;
const GL_TRUE: c_uchar = 1;
const GL_NO_ERROR: c_uint = 0;
const GL_VENDOR: c_uint = 0x1f00;
const GL_RENDERER: c_uint = 0x1f01;
const GL_VERSION: c_uint = 0x1f02;
const GL_EXTENSIONS: c_uint = 0x1f03;
const GL_SHADER_TYPE: c_uint = 0x8b4f;
const GL_SHADER_SOURCE_LENGTH: c_uint = 0x8b88;

pub(crate) const EXTENSIONS: &[u8] =
    b"GL_OES_vertex_array_object GL_EXT_debug_marker GL_EXT_discard_framebuffer\0";

pub(crate) fn lookup(name: &CStr) -> *const c_void {
    match name.to_bytes() {
        b"glClear" => clear as *const c_void,
        b"glCreateShader" => create_shader as *const c_void,
        b"glDeleteShader" => delete_shader as *const c_void,
        b"glFinish" => finish as *const c_void,
        b"glFlush" => finish as *const c_void,
        b"glGetError" => get_error as *const c_void,
        b"glGetShaderiv" => get_shader_iv as *const c_void,
        b"glGetShaderSource" => get_shader_source as *const c_void,
        b"glGetString" => get_string as *const c_void,
        b"glIsShader" => is_shader as *const c_void,
        b"glShaderSource" => shader_source as *const c_void,
        b"glBindVertexArrayOES" => bind_vertex_array as *const c_void,
        b"glDiscardFramebufferEXT" => discard_framebuffer as *const c_void,
        b"glInsertEventMarkerEXT" => event_marker as *const c_void,
        _ => ptr::null(),
    }
}

extern "system" fn clear(_mask: c_uint) {}

extern "system" fn finish() {}

extern "system" fn get_error() -> c_uint {
    GL_NO_ERROR
}

extern "system" fn create_shader(kind: c_uint) -> c_uint {
    driver::with_current_namespace(|namespace| namespace.create_shader(kind)).unwrap_or(0)
}

extern "system" fn delete_shader(shader: c_uint) {
    driver::with_current_namespace(|namespace| namespace.shaders.remove(&shader));
}

extern "system" fn is_shader(shader: c_uint) -> c_uchar {
    let exists = driver::with_current_namespace(|namespace| {
        namespace.shaders.contains_key(&shader)
    });
    if exists == Some(true) { GL_TRUE } else { GL_FALSE }
}

unsafe extern "system" fn shader_source(shader: c_uint,
                                        count: c_int,
                                        strings: *const *const c_char,
                                        lengths: *const c_int) {
    if strings.is_null() || count < 0 {
        return;
    }
    let mut source = vec![];
    for index in 0..(count as usize) {
        let string = *strings.add(index);
        if string.is_null() {
            continue;
        }
        let length = if lengths.is_null() || *lengths.add(index) < 0 {
            CStr::from_ptr(string).to_bytes().len()
        } else {
            *lengths.add(index) as usize
        };
        source.extend_from_slice(slice::from_raw_parts(string as *const u8, length));
    }
    driver::with_current_namespace(|namespace| {
        if let Some(object) = namespace.shaders.get_mut(&shader) {
            object.source = source;
        }
    });
}

unsafe extern "system" fn get_shader_source(shader: c_uint,
                                            buffer_size: c_int,
                                            length: *mut c_int,
                                            source: *mut c_char) {
    let stored = driver::with_current_namespace(|namespace| {
        namespace.shaders.get(&shader).map(|object| object.source.clone())
    }).flatten().unwrap_or_default();

    let mut written = 0;
    if buffer_size > 0 && !source.is_null() {
        written = stored.len().min(buffer_size as usize - 1);
        ptr::copy_nonoverlapping(stored.as_ptr() as *const c_char, source, written);
        *source.add(written) = 0;
    }
    if !length.is_null() {
        *length = written as c_int;
    }
}

unsafe extern "system" fn get_shader_iv(shader: c_uint, name: c_uint, params: *mut c_int) {
    let value = driver::with_current_namespace(|namespace| {
        namespace.shaders.get(&shader).map(|object| match name {
            GL_SHADER_TYPE => object.kind as c_int,
            GL_SHADER_SOURCE_LENGTH => object.source.len() as c_int + 1,
            _ => 0,
        })
    }).flatten();
    if let (Some(value), false) = (value, params.is_null()) {
        *params = value;
    }
}

extern "system" fn get_string(name: c_uint) -> *const c_uchar {
    if driver::current() == 0 {
        return ptr::null();
    }
    let string: &'static [u8] = match name {
        GL_VENDOR => b"portgfx\0",
        GL_RENDERER => b"portgfx simulated driver\0",
        GL_VERSION => b"OpenGL ES 2.0 portgfx\0",
        GL_EXTENSIONS => EXTENSIONS,
        _ => return ptr::null(),
    };
    string.as_ptr()
}

extern "system" fn bind_vertex_array(_array: c_uint) {}

extern "system" fn discard_framebuffer(_target: c_uint,
                                       _count: c_int,
                                       _attachments: *const c_uint) {}

extern "system" fn event_marker(_length: c_int, _marker: *const c_char) {}
