//! Pixel formats a camera frame can arrive in, and their conversion to 8-bit
//! luminance.
//!
//! Channel names run from the most significant bits to the least, so `Xrgb8`
//! keeps red in bits 16-23 and `Rgba5` keeps red in bits 11-15. Packed pixels
//! are stored little-endian in frame buffers.

/// Pixel format tag of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    Xbgr8,
    Xrgb8,
    Argb8,
    Abgr8,
    Bgrx8,
    Rgbx8,
    Rgba8,
    Bgra8,
    Rgb5,
    Bgr5,
    Argb5,
    Abgr5,
    Rgba5,
    Bgra5,
    Rgb565,
    Bgr565,
    L8,
    /// 24-bit packed, not capturable.
    Rgb8,
    /// 24-bit packed, not capturable.
    Bgr8,
    /// Palette indices, not capturable.
    Pal8,
}

#[derive(Debug, Clone, Copy)]
struct Channel {
    shift: u8,
    bits: u8,
}

impl Channel {
    const fn new(shift: u8, bits: u8) -> Self {
        Channel { shift, bits }
    }

    /// Extract the channel and widen it to 8 bits.
    fn expand(self, pixel: u32) -> u32 {
        let mask = (1u32 << self.bits) - 1;
        let c = (pixel >> self.shift) & mask;
        match self.bits {
            5 => (c << 3) | (c >> 2),
            6 => (c << 2) | (c >> 4),
            _ => c,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    r: Channel,
    g: Channel,
    b: Channel,
}

const fn rgb(r: Channel, g: Channel, b: Channel) -> Layout {
    Layout { r, g, b }
}

impl ColorFormat {
    /// Size of one pixel in a frame buffer, `None` for formats a capture
    /// cannot read.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        use ColorFormat::*;
        match self {
            Xbgr8 | Xrgb8 | Argb8 | Abgr8 | Bgrx8 | Rgbx8 | Rgba8 | Bgra8 => Some(4),
            Rgb5 | Bgr5 | Argb5 | Abgr5 | Rgba5 | Bgra5 | Rgb565 | Bgr565 => Some(2),
            L8 => Some(1),
            Rgb8 | Bgr8 | Pal8 => None,
        }
    }

    pub fn is_supported(self) -> bool {
        self.bytes_per_pixel().is_some()
    }

    fn layout(self) -> Option<Layout> {
        use ColorFormat::*;
        let c = Channel::new;
        let layout = match self {
            Xbgr8 | Abgr8 => rgb(c(0, 8), c(8, 8), c(16, 8)),
            Xrgb8 | Argb8 => rgb(c(16, 8), c(8, 8), c(0, 8)),
            Rgbx8 | Rgba8 => rgb(c(24, 8), c(16, 8), c(8, 8)),
            Bgrx8 | Bgra8 => rgb(c(8, 8), c(16, 8), c(24, 8)),
            Rgb5 | Argb5 => rgb(c(10, 5), c(5, 5), c(0, 5)),
            Bgr5 | Abgr5 => rgb(c(0, 5), c(5, 5), c(10, 5)),
            Rgba5 => rgb(c(11, 5), c(6, 5), c(1, 5)),
            Bgra5 => rgb(c(1, 5), c(6, 5), c(11, 5)),
            Rgb565 => rgb(c(11, 5), c(5, 6), c(0, 5)),
            Bgr565 => rgb(c(0, 5), c(5, 6), c(11, 5)),
            L8 | Rgb8 | Bgr8 | Pal8 => return None,
        };
        Some(layout)
    }

    /// Convert one packed pixel to 8-bit luminance.
    ///
    /// Uses BT.601 integer weights, which sum to 256 so gray pixels keep their
    /// exact level. Returns `None` for unsupported formats.
    pub fn luminance(self, pixel: u32) -> Option<u8> {
        if self == ColorFormat::L8 {
            return Some((pixel & 0xFF) as u8);
        }
        let layout = self.layout()?;
        let r = layout.r.expand(pixel);
        let g = layout.g.expand(pixel);
        let b = layout.b.expand(pixel);
        Some(((77 * r + 150 * g + 29 * b) >> 8) as u8)
    }

    /// Stable numeric tag used by the FFI and wasm bindings.
    pub fn from_code(code: u8) -> Option<Self> {
        use ColorFormat::*;
        const ALL: [ColorFormat; 20] = [
            Xbgr8, Xrgb8, Argb8, Abgr8, Bgrx8, Rgbx8, Rgba8, Bgra8, Rgb5, Bgr5, Argb5, Abgr5,
            Rgba5, Bgra5, Rgb565, Bgr565, L8, Rgb8, Bgr8, Pal8,
        ];
        ALL.get(code as usize).copied()
    }
}
