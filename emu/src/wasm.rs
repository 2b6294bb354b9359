//! WASM bindings for the web frontend.

use wasm_bindgen::prelude::*;

use crate::config::{CaptureMode, PocketCamConfig};
use crate::host::PocketCamCore;
use crate::log::LogCategory;
use crate::memory::camera::{CAMERA_HEIGHT, CAMERA_WIDTH};
use crate::{log_info, log_warn};

/// Initialize panic hook for better error messages in WASM.
/// This is called once when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct PocketCam {
    core: PocketCamCore,
}

#[wasm_bindgen]
impl PocketCam {
    #[wasm_bindgen(constructor)]
    pub fn new(rom_data: &[u8]) -> Result<PocketCam, JsValue> {
        log_info!(
            LogCategory::General,
            "PocketCam::new() - Loading ROM of {} bytes",
            rom_data.len()
        );
        let core = PocketCamCore::new(rom_data).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(PocketCam { core })
    }

    /// Create with a JSON config, e.g. `{"capture_mode":"raw"}`.
    pub fn with_config(rom_data: &[u8], config: &str) -> Result<PocketCam, JsValue> {
        let config =
            PocketCamConfig::from_json(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let core = PocketCamCore::with_config(rom_data, config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(PocketCam { core })
    }

    /// Bus read from 0x0000-0x7FFF or 0xA000-0xBFFF.
    pub fn read(&self, addr: u16) -> u8 {
        self.core.read(addr)
    }

    /// Bus write. Writing A000 with bit 0 set in register mode captures.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.core.write(addr, value);
    }

    /// Set camera image data from webcam.
    /// Expects 128x112 pixels as raw 8-bit grayscale (0=black, 255=white).
    pub fn set_camera_image(&mut self, data: &[u8]) {
        if data.len() < CAMERA_WIDTH * CAMERA_HEIGHT {
            log_warn!(
                LogCategory::Camera,
                "set_camera_image: short image of {} bytes",
                data.len()
            );
        }
        self.core.set_camera_image(data);
    }

    /// Check if camera image is ready for capture.
    pub fn is_camera_ready(&mut self) -> bool {
        self.core.is_camera_ready()
    }

    /// Switch between dithered and raw 4-level captures.
    pub fn set_raw_capture(&mut self, raw: bool) {
        let mode = if raw {
            CaptureMode::Raw
        } else {
            CaptureMode::Dithered
        };
        self.core.set_capture_mode(mode);
    }

    /// Update the camera live view buffer if the capture has changed.
    /// Returns true if the buffer was updated.
    pub fn update_camera_live(&mut self) -> bool {
        self.core.update_camera_live()
    }

    /// Pointer to the camera live view RGBA buffer (128×112×4 bytes).
    pub fn camera_live_ptr(&self) -> *const u8 {
        self.core.camera_live().as_ptr()
    }

    /// Length of the camera live view buffer.
    pub fn camera_live_len(&self) -> usize {
        self.core.camera_live().len()
    }

    /// Decode a GB Camera photo slot to RGBA pixel data.
    /// Slot 0 = active capture, 1-30 = saved photos. Returns empty if slot is unoccupied.
    pub fn decode_camera_photo(&self, slot: u8) -> Vec<u8> {
        self.core.decode_camera_photo(slot)
    }

    pub fn get_cartridge_ram(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.core.save_data())
    }

    pub fn load_cartridge_ram(&mut self, data: &[u8]) {
        self.core.load_save_data(data);
    }

    pub fn save_state(&self) -> String {
        self.core.save_state()
    }

    pub fn load_state(&mut self, json: &str) -> Result<(), JsValue> {
        self.core
            .load_state(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Get debug info about the controller state and log to console.
    pub fn get_debug_info(&self) -> String {
        let state = self.core.cart.state();
        let memory = self.core.cart.memory();
        let info = format!(
            "ROM bank: {}, RAM bank: {}, RAM enabled: {}, registers: {}, exposure: {:04X}",
            memory.rom_bank(),
            memory.ram_bank(),
            memory.is_ram_enabled(),
            state.registers_active,
            state.exposure(),
        );
        log_info!(LogCategory::General, "{}", info);
        info
    }
}
