//! Game Boy Camera (Pocket Camera) sensor emulation and photo decoding.
//!
//! A capture turns one host frame into the 128x112 2bpp tile image the
//! cartridge ROM expects at SRAM offset 0x0100: 16 tiles wide, 14 tiles tall,
//! 16 bytes per tile, 3584 bytes in total.
//!
//! Sensor registers used:
//! - A000: control, bit 0 = capture trigger
//! - A002-A003: exposure time (16-bit, A002 is the high byte)
//! - A006-A035: dithering matrix, 16 threshold triples for a 4x4 pattern

use crate::config::CaptureMode;
use crate::error::CaptureError;
use crate::image::{Frame, ImageSource};

pub const CAMERA_WIDTH: usize = 128;
pub const CAMERA_HEIGHT: usize = 112;
/// SRAM offset of the active capture buffer.
pub const CAPTURE_OFFSET: usize = 0x0100;
/// Size of one 2bpp photo (16x14 tiles of 16 bytes).
pub const CAPTURE_BYTES: usize = CAMERA_WIDTH * CAMERA_HEIGHT / 4;
/// Number of sensor registers backed by storage (A000-A035).
pub const REGISTER_COUNT: usize = 0x36;

const EXPOSURE_HIGH: usize = 0x02;
const EXPOSURE_LOW: usize = 0x03;
const MATRIX_OFFSET: usize = 0x06;

/// 2-bit codes as they are ORed into a tile row: bit 0 lands in the low
/// bitplane byte, bit 8 in the high bitplane byte.
pub const CODE_BLACK: u16 = 0x101;
pub const CODE_DARK: u16 = 0x100;
pub const CODE_LIGHT: u16 = 0x001;
pub const CODE_WHITE: u16 = 0x000;

/// Raw capture levels, indexed by `(luminance + 42) / 85`.
const RAW_CODES: [u16; 4] = [CODE_BLACK, CODE_DARK, CODE_LIGHT, CODE_WHITE];

/// Grayscale for each decoded color index (0 = white ... 3 = black).
pub const PALETTE: [u8; 4] = [0xFF, 0xAA, 0x55, 0x00];

/// Camera state vector: 30 bytes at SRAM 0x11B2, one per album slot.
/// 0xFF = empty/erased, anything else = occupied.
const STATE_VECTOR_OFFSET: usize = 0x11B2;
const ALBUM_SLOTS: u8 = 30;

/// Controller state owned by the cartridge for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PocketCamState {
    /// Register bank (true) or RAM bank (false) mapped at A000-BFFF.
    pub registers_active: bool,
    pub registers: [u8; REGISTER_COUNT],
}

/// How many pixels of each color index a capture produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub counts: [u32; 4],
}

impl CaptureStats {
    fn record(&mut self, code: u16) {
        self.counts[color_index(code)] += 1;
    }
}

impl PocketCamState {
    pub fn new() -> Self {
        PocketCamState {
            registers_active: false,
            registers: [0; REGISTER_COUNT],
        }
    }

    pub fn exposure(&self) -> u16 {
        u16::from_be_bytes([self.registers[EXPOSURE_HIGH], self.registers[EXPOSURE_LOW]])
    }

    /// Dark, mid and light thresholds for the pixel at (x, y).
    pub fn thresholds(&self, x: usize, y: usize) -> [u8; 3] {
        let entry = MATRIX_OFFSET + 3 * ((x & 3) + 4 * (y & 3));
        [
            self.registers[entry],
            self.registers[entry + 1],
            self.registers[entry + 2],
        ]
    }

    /// Pull one frame from `source` and render it into `ram` at 0x0100.
    ///
    /// The capture region is zeroed before any pixel is written. Missing
    /// frames leave `ram` untouched; a frame that cannot be read leaves the
    /// region zeroed.
    pub fn capture(
        &self,
        ram: &mut [u8],
        source: Option<&mut dyn ImageSource>,
        mode: CaptureMode,
    ) -> Result<CaptureStats, CaptureError> {
        let source = source.ok_or(CaptureError::NoImageSource)?;
        let frame = source.request_image().ok_or(CaptureError::NoFrame)?;

        let end = CAPTURE_OFFSET + CAPTURE_BYTES;
        if ram.len() < end {
            return Err(CaptureError::RamTooSmall {
                needed: end,
                actual: ram.len(),
            });
        }
        let out = &mut ram[CAPTURE_OFFSET..end];
        out.fill(0);

        validate_frame(&frame)?;

        let exposure = self.exposure();
        let mut stats = CaptureStats::default();
        for y in 0..CAMERA_HEIGHT {
            for x in 0..CAMERA_WIDTH {
                let gray = frame
                    .luminance(x, y)
                    .ok_or(CaptureError::UnsupportedFormat(frame.format))?;
                let code = match mode {
                    CaptureMode::Dithered => {
                        quantize(apply_exposure(gray, exposure), self.thresholds(x, y))
                    }
                    CaptureMode::Raw => raw_code(gray),
                };
                stats.record(code);
                plot(out, x, y, code);
            }
        }
        Ok(stats)
    }
}

impl Default for PocketCamState {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_frame(frame: &Frame<'_>) -> Result<(), CaptureError> {
    if frame.format.bytes_per_pixel().is_none() {
        return Err(CaptureError::UnsupportedFormat(frame.format));
    }
    if frame.stride < CAMERA_WIDTH {
        return Err(CaptureError::StrideTooSmall {
            stride: frame.stride,
        });
    }
    // A window whose size overflows can never fit in the buffer.
    let needed = frame
        .required_len(CAMERA_WIDTH, CAMERA_HEIGHT)
        .unwrap_or(usize::MAX);
    if frame.data.len() < needed {
        return Err(CaptureError::FrameTooSmall {
            needed,
            actual: frame.data.len(),
        });
    }
    Ok(())
}

/// Weight raw luminance by the 16-bit exposure value.
pub fn apply_exposure(gray: u8, exposure: u16) -> u32 {
    (gray as u32 + 1) * exposure as u32 / 0x100
}

/// Classify an exposed pixel against its threshold triple.
pub fn quantize(adjusted: u32, thresholds: [u8; 3]) -> u16 {
    let [dark, mid, light] = thresholds.map(u32::from);
    if adjusted < dark {
        CODE_BLACK
    } else if adjusted < mid {
        CODE_DARK
    } else if adjusted < light {
        CODE_LIGHT
    } else {
        CODE_WHITE
    }
}

/// Fixed four-level mapping used by raw captures. Luminance between the
/// levels is clamped to the nearest one (e.g. 200 maps like 170).
pub fn raw_code(gray: u8) -> u16 {
    RAW_CODES[(gray as usize + 42) / 85]
}

/// Byte offset of the tile row holding pixel (x, y), relative to 0x0100.
pub fn tile_offset(x: usize, y: usize) -> usize {
    (((x >> 3) & 0xF) * 8 + (y & 7)) * 2 + (y & !7) * 0x20
}

/// OR a code into its tile row. The row is a little-endian word: low byte is
/// bitplane 0, high byte bitplane 1.
fn plot(out: &mut [u8], x: usize, y: usize, code: u16) {
    let coord = tile_offset(x, y);
    let existing = u16::from_le_bytes([out[coord], out[coord + 1]]);
    let updated = existing | (code << (7 - (x & 7)));
    out[coord..coord + 2].copy_from_slice(&updated.to_le_bytes());
}

/// Color index (0 = white ... 3 = black) of a code.
pub fn color_index(code: u16) -> usize {
    ((code & 1) | ((code >> 7) & 2)) as usize
}

/// Decode one 128x112 tile image into RGBA.
/// `tiles` must hold `CAPTURE_BYTES` bytes and `rgba` 128x112x4.
pub fn decode_photo_into(tiles: &[u8], rgba: &mut [u8]) {
    for y in 0..CAMERA_HEIGHT {
        for x in 0..CAMERA_WIDTH {
            let coord = tile_offset(x, y);
            let low = tiles[coord];
            let high = tiles[coord + 1];
            let bit = 7 - (x & 7);
            let color_idx = ((high >> bit) & 1) << 1 | ((low >> bit) & 1);
            let gray = PALETTE[color_idx as usize];

            let i = (y * CAMERA_WIDTH + x) * 4;
            rgba[i] = gray;
            rgba[i + 1] = gray;
            rgba[i + 2] = gray;
            rgba[i + 3] = 255;
        }
    }
}

/// SRAM offset of a photo slot.
/// Slot 0 = active capture buffer (bank 0, offset 0x0100).
/// Slots 1-30 = saved photos in banks 1-15 (2 per bank).
pub fn photo_offset(slot: u8) -> Option<usize> {
    match slot {
        0 => Some(CAPTURE_OFFSET),
        1..=ALBUM_SLOTS => {
            let adjusted = (slot - 1) as usize;
            let bank = adjusted / 2 + 1;
            let offset_in_bank = (adjusted % 2) * 0x1000;
            Some(bank * super::RAM_BANK_SIZE + offset_in_bank)
        }
        _ => None,
    }
}

/// Decode a photo slot from SRAM into RGBA pixel data.
/// Returns an empty vec if the slot is unoccupied or out of range.
pub fn decode_photo(ram: &[u8], slot: u8) -> Vec<u8> {
    if (1..=ALBUM_SLOTS).contains(&slot) {
        let state_idx = STATE_VECTOR_OFFSET + (slot - 1) as usize;
        if ram.get(state_idx) == Some(&0xFF) {
            return Vec::new();
        }
    }
    let Some(offset) = photo_offset(slot) else {
        return Vec::new();
    };
    let Some(tiles) = ram.get(offset..offset + CAPTURE_BYTES) else {
        return Vec::new();
    };
    let mut rgba = vec![0u8; CAMERA_WIDTH * CAMERA_HEIGHT * 4];
    decode_photo_into(tiles, &mut rgba);
    rgba
}
