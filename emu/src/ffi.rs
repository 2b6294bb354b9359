//! C-compatible FFI layer for iOS integration.
//!
//! This module provides extern "C" functions that can be called from Swift
//! via a bridging header generated by the build script.

use std::ffi::c_void;
use std::ptr;
use std::slice;

use crate::color::ColorFormat;
use crate::config::CaptureMode;
use crate::host::PocketCamCore;
use crate::log::LogCategory;
use crate::log_warn;
use crate::memory::camera::{CAMERA_HEIGHT, CAMERA_WIDTH};

unsafe fn handle_ref<'a>(handle: *const c_void) -> &'a PocketCamCore {
    unsafe { &*(handle as *const PocketCamCore) }
}

unsafe fn handle_mut<'a>(handle: *mut c_void) -> &'a mut PocketCamCore {
    unsafe { &mut *(handle as *mut PocketCamCore) }
}

// ============================================================================
// C FFI Functions
// ============================================================================

/// Create a Pocket Camera cartridge from a ROM image.
/// Returns an opaque pointer that must be freed with `gb_cam_destroy`,
/// or NULL if the ROM is not a Pocket Camera ROM.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_create(data: *const u8, len: usize) -> *mut c_void {
    if data.is_null() || len == 0 {
        return ptr::null_mut();
    }

    let rom = unsafe { slice::from_raw_parts(data, len) };
    match PocketCamCore::new(rom) {
        Ok(core) => Box::into_raw(Box::new(core)) as *mut c_void,
        Err(err) => {
            log_warn!(LogCategory::General, "gb_cam_create: {}", err);
            ptr::null_mut()
        }
    }
}

/// Destroy a cartridge instance.
/// The pointer must have been created by `gb_cam_create`.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_destroy(handle: *mut c_void) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle as *mut PocketCamCore);
        }
    }
}

/// Bus read from 0x0000-0x7FFF or 0xA000-0xBFFF. Returns 0xFF on a NULL handle.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_read(handle: *const c_void, addr: u16) -> u8 {
    if handle.is_null() {
        return 0xFF;
    }
    unsafe { handle_ref(handle) }.read(addr)
}

/// Bus write. May run a capture before returning.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_write(handle: *mut c_void, addr: u16, value: u8) {
    if handle.is_null() {
        return;
    }
    unsafe { handle_mut(handle) }.write(addr, value);
}

/// Set camera image data.
/// Expects 128x112 pixels as 8-bit grayscale (0=black, 255=white).
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_set_camera_image(handle: *mut c_void, data: *const u8, len: usize) {
    if handle.is_null() || data.is_null() {
        return;
    }

    let expected_len = CAMERA_WIDTH * CAMERA_HEIGHT;
    if len < expected_len {
        return;
    }

    unsafe {
        let image = slice::from_raw_parts(data, expected_len);
        handle_mut(handle).set_camera_image(image);
    }
}

/// Set camera image from a packed frame. `stride` is in pixels and `format`
/// is a `GB_CAM_FORMAT_*` code. Returns false for unknown format codes.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_set_camera_frame(
    handle: *mut c_void,
    data: *const u8,
    len: usize,
    stride: usize,
    format: u8,
) -> bool {
    if handle.is_null() || data.is_null() {
        return false;
    }
    let Some(format) = ColorFormat::from_code(format) else {
        return false;
    };

    unsafe {
        let frame = slice::from_raw_parts(data, len);
        if let Some(image) = handle_mut(handle).cart.image_source_mut() {
            image.set_frame(frame, stride, format);
        }
    }
    true
}

/// Select raw (true) or dithered (false) captures.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_set_raw_capture(handle: *mut c_void, raw: bool) {
    if handle.is_null() {
        return;
    }
    let mode = if raw {
        CaptureMode::Raw
    } else {
        CaptureMode::Dithered
    };
    unsafe { handle_mut(handle) }.set_capture_mode(mode);
}

/// Refresh the live view. Returns true if it changed since the last call.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_update_live(handle: *mut c_void) -> bool {
    if handle.is_null() {
        return false;
    }
    unsafe { handle_mut(handle) }.update_camera_live()
}

/// Get a pointer to the live view (128x112 RGBA pixels).
/// The buffer is owned by the cartridge and valid until the next update or destruction.
/// Returns NULL if handle is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_get_live_buffer(handle: *const c_void) -> *const u8 {
    if handle.is_null() {
        return ptr::null();
    }
    unsafe { handle_ref(handle) }.camera_live().as_ptr()
}

/// Get the live view size in bytes (always 128 * 112 * 4 = 57344).
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_get_live_buffer_size() -> usize {
    CAMERA_WIDTH * CAMERA_HEIGHT * 4
}

/// Decode a photo slot into `buffer` as RGBA.
/// Returns the number of bytes written, or 0 if the slot is empty.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_decode_photo(
    handle: *const c_void,
    slot: u8,
    buffer: *mut u8,
    buffer_len: usize,
) -> usize {
    if handle.is_null() || buffer.is_null() {
        return 0;
    }

    unsafe {
        let rgba = handle_ref(handle).decode_camera_photo(slot);
        let copy_len = rgba.len().min(buffer_len);
        if copy_len > 0 {
            ptr::copy_nonoverlapping(rgba.as_ptr(), buffer, copy_len);
        }
        copy_len
    }
}

/// Get cartridge RAM (save data) size.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_get_save_size(handle: *const c_void) -> usize {
    if handle.is_null() {
        return 0;
    }
    unsafe { handle_ref(handle) }.save_data().len()
}

/// Copy cartridge RAM (save data) to the provided buffer.
/// Returns the number of bytes copied, or 0 on error.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_get_save_data(
    handle: *const c_void,
    buffer: *mut u8,
    buffer_len: usize,
) -> usize {
    if handle.is_null() || buffer.is_null() {
        return 0;
    }

    unsafe {
        let ram = handle_ref(handle).save_data();
        let copy_len = ram.len().min(buffer_len);
        if copy_len > 0 {
            ptr::copy_nonoverlapping(ram.as_ptr(), buffer, copy_len);
        }
        copy_len
    }
}

/// Load cartridge RAM (save data) from the provided buffer.
/// Returns true on success.
#[unsafe(no_mangle)]
pub extern "C" fn gb_cam_load_save_data(handle: *mut c_void, data: *const u8, len: usize) -> bool {
    if handle.is_null() || data.is_null() || len == 0 {
        return false;
    }

    unsafe {
        let save_data = slice::from_raw_parts(data, len);
        handle_mut(handle).load_save_data(save_data);
    }
    true
}

// Camera dimensions
pub const GB_CAMERA_WIDTH: u32 = CAMERA_WIDTH as u32;
pub const GB_CAMERA_HEIGHT: u32 = CAMERA_HEIGHT as u32;

// Frame format codes for `gb_cam_set_camera_frame`
pub const GB_CAM_FORMAT_XRGB8: u8 = 1;
pub const GB_CAM_FORMAT_RGB565: u8 = 14;
pub const GB_CAM_FORMAT_L8: u8 = 16;
