// Cartridge core modules (always compiled)
pub mod color;
pub mod config;
pub mod error;
mod host;
pub mod image;
pub mod log;
pub mod memory;
mod state;

// FFI module for iOS/native builds
#[cfg(feature = "ios")]
pub mod ffi;

// WASM module for web builds
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::*;

pub use color::ColorFormat;
pub use config::{CaptureMode, PocketCamConfig};
pub use error::{CaptureError, ConfigError, LoadError, StateError};
pub use image::{Frame, ImageSource, StillImage};
pub use memory::camera::{CAMERA_HEIGHT, CAMERA_WIDTH, CaptureStats, PocketCamState};
pub use memory::cartridge::{Cartridge, PocketCamera};
pub use memory::CartMemory;
