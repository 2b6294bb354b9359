//! Image sources feeding the camera sensor.
//!
//! A capture pulls exactly one [`Frame`] from the attached [`ImageSource`]
//! and drops the borrow before the bus write returns.

use crate::color::ColorFormat;
use crate::memory::camera::{CAMERA_HEIGHT, CAMERA_WIDTH};

/// One borrowed camera frame. `stride` is in pixels.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub data: &'a [u8],
    pub stride: usize,
    pub format: ColorFormat,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a [u8], stride: usize, format: ColorFormat) -> Self {
        Frame {
            data,
            stride,
            format,
        }
    }

    /// Read the packed pixel at (x, y) as a little-endian word.
    /// Returns `None` for unsupported formats or out-of-bounds pixels.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        let bpp = self.format.bytes_per_pixel()?;
        let start = y
            .checked_mul(self.stride)?
            .checked_add(x)?
            .checked_mul(bpp)?;
        let bytes = self.data.get(start..start.checked_add(bpp)?)?;
        let mut word = [0u8; 4];
        word[..bpp].copy_from_slice(bytes);
        Some(u32::from_le_bytes(word))
    }

    pub fn luminance(&self, x: usize, y: usize) -> Option<u8> {
        self.format.luminance(self.pixel(x, y)?)
    }

    /// Bytes needed to cover a `width` x `height` window at this stride.
    /// `None` for unsupported formats or when the size overflows `usize`.
    pub fn required_len(&self, width: usize, height: usize) -> Option<usize> {
        let bpp = self.format.bytes_per_pixel()?;
        if width == 0 || height == 0 {
            return Some(0);
        }
        (height - 1)
            .checked_mul(self.stride)?
            .checked_add(width)?
            .checked_mul(bpp)
    }
}

/// Pull-based supplier of camera frames (webcam bridge, test pattern, ...).
pub trait ImageSource {
    /// Hand out the current frame, or `None` when nothing is available.
    fn request_image(&mut self) -> Option<Frame<'_>>;

    /// Called when the source is attached to a cartridge.
    fn start(&mut self, _width: usize, _height: usize) {}

    /// Called when the source is detached.
    fn stop(&mut self) {}
}

impl<T: ImageSource + ?Sized> ImageSource for Box<T> {
    fn request_image(&mut self) -> Option<Frame<'_>> {
        (**self).request_image()
    }

    fn start(&mut self, width: usize, height: usize) {
        (**self).start(width, height)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Frame buffer filled by the host, e.g. with the latest webcam picture.
pub struct StillImage {
    data: Vec<u8>,
    stride: usize,
    format: ColorFormat,
    ready: bool,
}

impl StillImage {
    pub fn new() -> Self {
        StillImage {
            data: vec![0; CAMERA_WIDTH * CAMERA_HEIGHT],
            stride: CAMERA_WIDTH,
            format: ColorFormat::L8,
            ready: false,
        }
    }

    /// Set the image from 128x112 8-bit grayscale (0 = black, 255 = white).
    /// Shorter input leaves the remaining pixels unchanged.
    pub fn set_grayscale(&mut self, data: &[u8]) {
        if self.format != ColorFormat::L8 || self.stride != CAMERA_WIDTH {
            self.data = vec![0; CAMERA_WIDTH * CAMERA_HEIGHT];
            self.stride = CAMERA_WIDTH;
            self.format = ColorFormat::L8;
        }
        let len = data.len().min(CAMERA_WIDTH * CAMERA_HEIGHT);
        self.data[..len].copy_from_slice(&data[..len]);
        self.ready = true;
    }

    /// Replace the image with an arbitrary frame.
    pub fn set_frame(&mut self, data: &[u8], stride: usize, format: ColorFormat) {
        self.data.clear();
        self.data.extend_from_slice(data);
        self.stride = stride;
        self.format = format;
        self.ready = true;
    }

    pub fn clear(&mut self) {
        self.ready = false;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl Default for StillImage {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSource for StillImage {
    fn request_image(&mut self) -> Option<Frame<'_>> {
        if !self.ready {
            return None;
        }
        Some(Frame::new(&self.data, self.stride, self.format))
    }
}
