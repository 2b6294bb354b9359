//! Cartridge configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::memory::ram_size_from_header;

/// Which quantizer a capture trigger runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Exposure and the 4x4 threshold matrix from the sensor registers.
    #[default]
    Dithered,
    /// Fixed four-level mapping for frames already reduced to 0/85/170/255.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PocketCamConfig {
    pub capture_mode: CaptureMode,
    /// Cartridge RAM size in bytes.
    pub ram_size: usize,
}

impl Default for PocketCamConfig {
    fn default() -> Self {
        PocketCamConfig {
            capture_mode: CaptureMode::Dithered,
            ram_size: 128 * 1024,
        }
    }
}

impl PocketCamConfig {
    /// Defaults, with the RAM size taken from header byte 0x0149 when the ROM
    /// has a header.
    pub fn from_header(rom: &[u8]) -> Self {
        let mut config = Self::default();
        if let Some(&byte) = rom.get(0x0149) {
            config.ram_size = ram_size_from_header(byte);
        }
        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PocketCamConfig::default();
        assert_eq!(config.capture_mode, CaptureMode::Dithered);
        assert_eq!(config.ram_size, 0x20000);
    }

    #[test]
    fn test_from_header() {
        let mut rom = vec![0; 0x150];
        rom[0x0149] = 0x03;
        assert_eq!(PocketCamConfig::from_header(&rom).ram_size, 32 * 1024);
        assert_eq!(PocketCamConfig::from_header(&[]).ram_size, 128 * 1024);
    }

    #[test]
    fn test_json_partial_and_round_trip() {
        let config = PocketCamConfig::from_json(r#"{"capture_mode": "raw"}"#).unwrap();
        assert_eq!(config.capture_mode, CaptureMode::Raw);
        assert_eq!(config.ram_size, 128 * 1024);

        let json = config.to_json().unwrap();
        assert!(json.contains(r#""capture_mode":"raw""#));
        let back = PocketCamConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_rejects_unknown_mode() {
        let err = PocketCamConfig::from_json(r#"{"capture_mode": "sepia"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
