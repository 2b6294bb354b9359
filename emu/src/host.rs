//! Shared frontend core.
//!
//! [`PocketCamCore`] owns the cartridge with its still-image sensor feed and
//! keeps a double-buffered RGBA live view of the active capture for the wasm
//! and FFI bindings.

use crate::config::{CaptureMode, PocketCamConfig};
use crate::error::{LoadError, StateError};
use crate::image::StillImage;
use crate::log::LogCategory;
use crate::log_info;
use crate::memory::camera::{CAMERA_HEIGHT, CAMERA_WIDTH, CAPTURE_BYTES, decode_photo_into};
use crate::memory::cartridge::{Cartridge, PocketCamera};
use crate::memory::check_header;

const CAMERA_BUFFER_SIZE: usize = CAMERA_WIDTH * CAMERA_HEIGHT * 4;

pub(crate) struct DoubleBuffer<const N: usize> {
    buffers: [Box<[u8; N]>; 2],
    front: usize,
}

impl<const N: usize> DoubleBuffer<N> {
    pub fn new() -> Self {
        DoubleBuffer {
            buffers: [Box::new([0u8; N]), Box::new([0u8; N])],
            front: 0,
        }
    }

    #[inline]
    pub fn front(&self) -> &[u8; N] {
        &self.buffers[self.front]
    }

    #[inline]
    pub fn back_mut(&mut self) -> &mut [u8; N] {
        &mut self.buffers[1 - self.front]
    }

    #[inline]
    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }
}

pub(crate) struct PocketCamCore {
    pub(crate) cart: PocketCamera,
    pub(crate) camera_live_buffer: DoubleBuffer<CAMERA_BUFFER_SIZE>,
}

impl PocketCamCore {
    pub(crate) fn new(rom_data: &[u8]) -> Result<Self, LoadError> {
        Self::with_config(rom_data, PocketCamConfig::from_header(rom_data))
    }

    pub(crate) fn with_config(rom_data: &[u8], config: PocketCamConfig) -> Result<Self, LoadError> {
        check_header(rom_data)?;
        let mut cart = PocketCamera::new(rom_data.to_vec(), config);
        cart.attach_image_source(StillImage::new());
        log_info!(
            LogCategory::General,
            "Pocket Camera loaded: {} ROM banks, {} bytes RAM",
            cart.rom_bank_count(),
            cart.ram_data().len()
        );
        Ok(PocketCamCore {
            cart,
            camera_live_buffer: DoubleBuffer::new(),
        })
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        self.cart.read(addr)
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        self.cart.write(addr, value);
    }

    /// Set the sensor image from 128x112 8-bit grayscale.
    pub(crate) fn set_camera_image(&mut self, data: &[u8]) {
        if let Some(image) = self.cart.image_source_mut() {
            image.set_grayscale(data);
        }
    }

    pub(crate) fn is_camera_ready(&mut self) -> bool {
        self.cart
            .image_source_mut()
            .is_some_and(|image| image.is_ready())
    }

    pub(crate) fn set_capture_mode(&mut self, mode: CaptureMode) {
        self.cart.set_capture_mode(mode);
    }

    /// Refresh the live view if a capture completed since the last refresh.
    /// Returns true if the buffer was updated.
    pub(crate) fn update_camera_live(&mut self) -> bool {
        if !self.cart.is_capture_dirty() {
            return false;
        }
        self.cart.clear_capture_dirty();

        let sram = self.cart.capture_sram();
        if sram.len() < CAPTURE_BYTES {
            return false;
        }
        let back = self.camera_live_buffer.back_mut();
        decode_photo_into(sram, &mut back[..]);
        self.camera_live_buffer.swap();
        true
    }

    pub(crate) fn camera_live(&self) -> &[u8] {
        &self.camera_live_buffer.front()[..]
    }

    pub(crate) fn decode_camera_photo(&self, slot: u8) -> Vec<u8> {
        self.cart.decode_photo(slot)
    }

    pub(crate) fn save_data(&self) -> &[u8] {
        self.cart.ram_data()
    }

    pub(crate) fn load_save_data(&mut self, data: &[u8]) {
        self.cart.load_ram(data);
        // Album contents may have changed under the live view.
        self.cart.mark_capture_dirty();
    }

    pub(crate) fn save_state(&self) -> String {
        self.cart.save_state().to_string()
    }

    pub(crate) fn load_state(&mut self, json: &str) -> Result<(), StateError> {
        let state: serde_json::Value = serde_json::from_str(json)?;
        self.cart.load_state(&state)
    }
}
