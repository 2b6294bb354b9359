//! Error types. None of these ever reach the emulated bus: the register
//! interface consumes capture errors and turns them into diagnostics.

use crate::color::ColorFormat;

/// Reasons a capture did not produce an image.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no image source attached")]
    NoImageSource,
    #[error("image source has no frame available")]
    NoFrame,
    #[error("unsupported pixel format: {0:?}")]
    UnsupportedFormat(ColorFormat),
    #[error("frame too small: need {needed} bytes, got {actual}")]
    FrameTooSmall { needed: usize, actual: usize },
    #[error("frame stride {stride} is narrower than the sensor")]
    StrideTooSmall { stride: usize },
    #[error("cartridge RAM too small for capture: need {needed} bytes, got {actual}")]
    RamTooSmall { needed: usize, actual: usize },
}

impl CaptureError {
    /// Missing frames are routine (no webcam yet) and only skip the capture.
    pub fn is_skip(&self) -> bool {
        matches!(self, CaptureError::NoImageSource | CaptureError::NoFrame)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("ROM too small: {0} bytes")]
    RomTooSmall(usize),
    #[error("cartridge type 0x{0:02X} is not a Pocket Camera")]
    NotPocketCamera(u8),
}

#[derive(thiserror::Error, Debug)]
pub enum StateError {
    #[error("save state belongs to system '{0}'")]
    WrongSystem(String),
    #[error("unsupported save state version {0}")]
    UnsupportedVersion(u64),
    #[error("save state is missing field '{0}'")]
    MissingField(&'static str),
    #[error("save state field '{field}' is out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },
    #[error("expected {expected} camera registers, found {actual}")]
    RegisterLength { expected: usize, actual: usize },
    #[error("malformed save state: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}
