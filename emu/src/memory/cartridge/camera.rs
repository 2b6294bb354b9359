//! Pocket Camera (Game Boy Camera) cartridge controller.
//!
//! The controller splits the bus into 8KB windows by `addr >> 13`:
//!
//! - 0000-1FFF: RAM enable (0x00 off, 0x0A on)
//! - 2000-3FFF: ROM bank select (6-bit)
//! - 4000-5FFF: RAM bank 0x00-0x0F, or 0x10+ to map the sensor registers
//! - A000-BFFF: RAM, or sensor registers A000-A035 when mapped
//!
//! Writing A000 with bit 0 set captures a frame before the write returns.

use super::Cartridge;
use crate::config::{CaptureMode, PocketCamConfig};
use crate::error::LoadError;
use crate::image::{ImageSource, StillImage};
use crate::log::{LogCategory, RateLimiter};
use crate::memory::camera::{
    self, CAMERA_HEIGHT, CAMERA_WIDTH, CAPTURE_BYTES, CAPTURE_OFFSET, CaptureStats,
    PocketCamState,
};
use crate::memory::{CartMemory, check_header};
use crate::{log_debug, log_info_limited, log_warn};

/// Apply one bus write to the controller.
///
/// Returns the capture statistics when the write triggered a capture that
/// produced an image.
pub fn write_control(
    state: &mut PocketCamState,
    mem: &mut CartMemory,
    source: Option<&mut dyn ImageSource>,
    mode: CaptureMode,
    addr: u16,
    value: u8,
) -> Option<CaptureStats> {
    match addr >> 13 {
        0x0 => match value {
            0x00 => mem.set_ram_enabled(false),
            0x0A => {
                // No RAM to re-select: keep the previous state.
                if mem.switch_ram_bank(mem.ram_bank()) {
                    mem.set_ram_enabled(true);
                }
            }
            _ => log_debug!(LogCategory::Mbc, "Pocket Cam unknown value {:02X}", value),
        },
        0x1 => mem.switch_rom_bank((value & 0x3F) as usize),
        0x2 => {
            if value < 0x10 {
                mem.switch_ram_bank(value as usize);
                state.registers_active = false;
                mem.set_direct_ram_access(true);
            } else {
                state.registers_active = true;
                mem.set_direct_ram_access(false);
            }
        }
        0x5 => return write_register(state, mem, source, mode, addr, value),
        _ => log_debug!(
            LogCategory::Mbc,
            "Pocket Cam unknown address: {:04X}:{:02X}",
            addr,
            value
        ),
    }
    None
}

fn write_register(
    state: &mut PocketCamState,
    mem: &mut CartMemory,
    source: Option<&mut dyn ImageSource>,
    mode: CaptureMode,
    addr: u16,
    value: u8,
) -> Option<CaptureStats> {
    if !state.registers_active {
        return None;
    }
    let reg = (addr & 0x7F) as usize;
    let mut value = value;
    let mut stats = None;
    if reg == 0 && value & 0x01 != 0 {
        // Capture completes immediately, so the busy bit never reads back.
        value &= 0x06;
        mem.mark_ram_dirty();
        stats = run_capture(state, mem, source, mode);
    }
    if let Some(slot) = state.registers.get_mut(reg) {
        *slot = value;
    }
    stats
}

fn run_capture(
    state: &PocketCamState,
    mem: &mut CartMemory,
    source: Option<&mut dyn ImageSource>,
    mode: CaptureMode,
) -> Option<CaptureStats> {
    static CAPTURE_LIMITER: RateLimiter = RateLimiter::new(50);

    match state.capture(mem.ram_mut(), source, mode) {
        Ok(stats) => {
            log_info_limited!(
                LogCategory::Camera,
                &CAPTURE_LIMITER,
                "Capture complete: mode={:?} exposure={:04X} colors [0]={}, [1]={}, [2]={}, [3]={}",
                mode,
                state.exposure(),
                stats.counts[0],
                stats.counts[1],
                stats.counts[2],
                stats.counts[3]
            );
            Some(stats)
        }
        Err(err) if err.is_skip() => {
            log_debug!(LogCategory::Camera, "Capture skipped: {}", err);
            None
        }
        Err(err) => {
            log_warn!(LogCategory::Camera, "Capture aborted: {}", err);
            None
        }
    }
}

/// Serve a read from A000-BFFF.
pub fn read_control(state: &PocketCamState, mem: &CartMemory, addr: u16) -> u8 {
    if state.registers_active {
        if addr & 0x7F == 0 {
            return state.registers[0];
        }
        return 0;
    }
    mem.read_ram(addr)
}

pub struct PocketCamera<S = StillImage> {
    pub(crate) memory: CartMemory,
    pub(crate) state: PocketCamState,
    source: Option<S>,
    config: PocketCamConfig,
    capture_dirty: bool,
}

impl<S: ImageSource> PocketCamera<S> {
    pub fn new(rom: Vec<u8>, config: PocketCamConfig) -> Self {
        PocketCamera {
            memory: CartMemory::new(rom, config.ram_size),
            state: PocketCamState::new(),
            source: None,
            config,
            capture_dirty: false,
        }
    }

    /// Build a cartridge from a ROM image, sizing RAM from its header.
    pub fn from_rom(rom: Vec<u8>) -> Result<Self, LoadError> {
        check_header(&rom)?;
        let config = PocketCamConfig::from_header(&rom);
        Ok(Self::new(rom, config))
    }

    /// Plug in the sensor's image source, replacing any previous one.
    pub fn attach_image_source(&mut self, mut source: S) {
        self.detach_image_source();
        source.start(CAMERA_WIDTH, CAMERA_HEIGHT);
        self.source = Some(source);
    }

    pub fn detach_image_source(&mut self) -> Option<S> {
        let mut source = self.source.take();
        if let Some(source) = source.as_mut() {
            source.stop();
        }
        source
    }

    pub fn image_source_mut(&mut self) -> Option<&mut S> {
        self.source.as_mut()
    }

    pub fn state(&self) -> &PocketCamState {
        &self.state
    }

    pub fn memory(&self) -> &CartMemory {
        &self.memory
    }

    pub fn config(&self) -> &PocketCamConfig {
        &self.config
    }

    pub fn set_capture_mode(&mut self, mode: CaptureMode) {
        self.config.capture_mode = mode;
    }

    /// Check if the active capture buffer has changed since last clear.
    pub fn is_capture_dirty(&self) -> bool {
        self.capture_dirty
    }

    pub fn clear_capture_dirty(&mut self) {
        self.capture_dirty = false;
    }

    pub fn mark_capture_dirty(&mut self) {
        self.capture_dirty = true;
    }

    /// The 3584-byte 2bpp tile region at SRAM offset 0x0100.
    pub fn capture_sram(&self) -> &[u8] {
        let ram = self.memory.ram();
        let end = (CAPTURE_OFFSET + CAPTURE_BYTES).min(ram.len());
        ram.get(CAPTURE_OFFSET..end).unwrap_or(&[])
    }

    /// Decode a photo slot to RGBA; see [`camera::decode_photo`].
    pub fn decode_photo(&self, slot: u8) -> Vec<u8> {
        camera::decode_photo(self.memory.ram(), slot)
    }
}

impl<S: ImageSource> Cartridge for PocketCamera<S> {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.memory.read_rom(addr),
            0xA000..=0xBFFF => read_control(&self.state, &self.memory, addr),
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if (0xA000..=0xBFFF).contains(&addr) && self.memory.is_ram_mapped() {
            self.memory.write_ram(addr, value);
            return;
        }
        let source = self.source.as_mut().map(|s| s as &mut dyn ImageSource);
        let captured = write_control(
            &mut self.state,
            &mut self.memory,
            source,
            self.config.capture_mode,
            addr,
            value,
        );
        if captured.is_some() {
            self.capture_dirty = true;
        }
    }

    fn ram_data(&self) -> &[u8] {
        self.memory.ram()
    }

    fn load_ram(&mut self, data: &[u8]) {
        self.memory.load_ram(data);
    }

    fn is_ram_dirty(&self) -> bool {
        self.memory.is_ram_dirty()
    }

    fn clear_ram_dirty(&mut self) {
        self.memory.clear_ram_dirty();
    }

    fn rom_bank_count(&self) -> usize {
        self.memory.rom_bank_count()
    }

    fn current_rom_bank(&self) -> usize {
        self.memory.rom_bank()
    }

    fn current_ram_bank(&self) -> usize {
        self.memory.ram_bank()
    }

    fn is_ram_enabled(&self) -> bool {
        self.memory.is_ram_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::camera::REGISTER_COUNT;
    use crate::memory::{POCKET_CAMERA_TYPE, RAM_BANK_SIZE, ROM_BANK_SIZE};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn camera_rom() -> Vec<u8> {
        let mut rom = vec![0; 4 * ROM_BANK_SIZE];
        for bank in 0..4 {
            rom[bank * ROM_BANK_SIZE + 0x10] = 0xB0 + bank as u8;
        }
        rom[0x0147] = POCKET_CAMERA_TYPE;
        rom[0x0149] = 0x04;
        rom
    }

    fn camera() -> PocketCamera {
        PocketCamera::from_rom(camera_rom()).unwrap()
    }

    fn camera_with_gray(level: u8) -> PocketCamera {
        let mut cam = camera();
        let mut image = StillImage::new();
        image.set_grayscale(&[level; CAMERA_WIDTH * CAMERA_HEIGHT]);
        cam.attach_image_source(image);
        cam
    }

    fn enter_register_mode<S: ImageSource>(cam: &mut PocketCamera<S>) {
        cam.write(0x4000, 0x10);
    }

    #[test]
    fn test_from_rom_checks_header() {
        let mut rom = camera_rom();
        rom[0x0147] = 0x19;
        assert_eq!(
            PocketCamera::<StillImage>::from_rom(rom).err(),
            Some(LoadError::NotPocketCamera(0x19))
        );
        assert_eq!(camera().ram_data().len(), 128 * 1024);
    }

    #[test]
    fn test_ram_enable_and_disable() {
        let mut cam = camera();
        cam.write(0x0000, 0x0A);
        assert!(cam.is_ram_enabled());
        cam.write(0xA010, 0x5C);
        assert_eq!(cam.read(0xA010), 0x5C);

        cam.write(0x1FFF, 0x00);
        assert!(!cam.is_ram_enabled());
        assert_eq!(cam.read(0xA010), 0x5C);
        assert_eq!(
            read_control(cam.state(), cam.memory(), 0xA010),
            cam.ram_data()[0x10]
        );
        cam.write(0xA010, 0x77);
        assert_eq!(cam.ram_data()[0x10], 0x5C);
    }

    #[test]
    fn test_unknown_enable_value_is_ignored() {
        init_logger();
        let mut cam = camera();
        cam.write(0x0000, 0x0A);
        cam.write(0x0000, 0x05);
        assert!(cam.is_ram_enabled());
        cam.write(0x0000, 0x00);
        cam.write(0x0000, 0xFA);
        assert!(!cam.is_ram_enabled());
    }

    #[test]
    fn test_enable_reselects_current_bank() {
        let mut cam = camera();
        cam.write(0x4000, 0x03);
        cam.write(0x0000, 0x0A);
        cam.write(0xA000, 0x33);
        assert_eq!(cam.ram_data()[3 * RAM_BANK_SIZE], 0x33);

        cam.write(0x0000, 0x00);
        cam.write(0x0000, 0x0A);
        assert_eq!(cam.current_ram_bank(), 3);
        assert_eq!(cam.read(0xA000), 0x33);
    }

    #[test]
    fn test_enable_without_ram_keeps_state() {
        let config = PocketCamConfig {
            ram_size: 0,
            ..PocketCamConfig::default()
        };
        let mut cam = PocketCamera::<StillImage>::new(camera_rom(), config);
        cam.write(0x0000, 0x0A);
        assert!(!cam.is_ram_enabled());
    }

    #[test]
    fn test_rom_bank_select_uses_six_bits() {
        let mut cam = camera();
        assert_eq!(cam.read(0x4010), 0xB1);
        cam.write(0x2000, 0xC2);
        assert_eq!(cam.current_rom_bank(), 2);
        assert_eq!(cam.read(0x4010), 0xB2);
        assert_eq!(cam.read(0x0010), 0xB0);
    }

    #[test]
    fn test_ram_bank_select_leaves_register_mode() {
        let mut cam = camera();
        enter_register_mode(&mut cam);
        assert!(cam.state().registers_active);
        assert!(!cam.memory().has_direct_ram_access());

        for bank in 0..0x10u8 {
            cam.write(0x4000, bank);
            assert_eq!(cam.current_ram_bank(), bank as usize);
            assert!(!cam.state().registers_active);
            assert!(cam.memory().has_direct_ram_access());
        }
    }

    #[test]
    fn test_register_mode_reads() {
        let mut cam = camera();
        cam.write(0x0000, 0x0A);
        cam.write(0xA000, 0x99);
        cam.write(0xA001, 0x98);

        for value in [0x10u8, 0x1F, 0x80, 0xFF] {
            cam.write(0x4000, value);
            assert!(cam.state().registers_active);
            cam.write(0xA000, 0x04);
            assert_eq!(cam.read(0xA000), cam.state().registers[0]);
            assert_eq!(cam.read(0xA000), 0x04);
            assert_eq!(cam.read(0xB080), 0x04);
            assert_eq!(cam.read(0xA001), 0x00);
        }

        // Back in RAM mode the RAM shows through again.
        cam.write(0x4000, 0x00);
        assert_eq!(cam.read(0xA000), 0x99);
        assert_eq!(cam.read(0xA001), 0x98);
    }

    #[test]
    fn test_trigger_bit_never_stored() {
        let mut cam = camera();
        enter_register_mode(&mut cam);
        for value in (0x01..=0xFFu8).step_by(2) {
            cam.write(0xA000, value);
            assert_eq!(cam.state().registers[0], value & 0b110, "value {value:02X}");
        }
        // Without the trigger bit the byte is stored as written.
        cam.write(0xA000, 0xF6);
        assert_eq!(cam.state().registers[0], 0xF6);
    }

    #[test]
    fn test_trigger_without_source_marks_dirty_only() {
        init_logger();
        let mut cam = camera();
        enter_register_mode(&mut cam);
        cam.write(0xA000, 0x03);
        assert!(cam.is_ram_dirty());
        assert!(!cam.is_capture_dirty());
        assert_eq!(cam.state().registers[0], 0x02);
        assert!(cam.capture_sram().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_register_writes_and_bounds() {
        let mut cam = camera();
        enter_register_mode(&mut cam);
        cam.write(0xA002, 0x12);
        cam.write(0xA003, 0x34);
        cam.write(0xA035, 0xEE);
        assert_eq!(cam.state().exposure(), 0x1234);
        assert_eq!(cam.state().registers[REGISTER_COUNT - 1], 0xEE);

        let before = cam.state().clone();
        cam.write(0xA036, 0x55);
        cam.write(0xA07F, 0x55);
        assert_eq!(cam.state(), &before);

        // Address is masked to 7 bits: A085 is register 5.
        cam.write(0xA085, 0x42);
        assert_eq!(cam.state().registers[5], 0x42);
    }

    #[test]
    fn test_register_writes_ignored_outside_register_mode() {
        let mut cam = camera();
        cam.write(0xA002, 0x12);
        assert_eq!(cam.state().registers[2], 0x00);
        assert!(!cam.is_ram_dirty());
    }

    #[test]
    fn test_unmapped_windows_are_noops() {
        init_logger();
        let mut cam = camera();
        cam.write(0x0000, 0x0A);
        let state = cam.state().clone();
        for addr in [0x6000u16, 0x7FFF, 0x8000, 0xC000, 0xE000, 0xFFFF] {
            cam.write(addr, 0xFF);
        }
        assert_eq!(cam.state(), &state);
        assert_eq!(cam.current_rom_bank(), 1);
        assert_eq!(cam.current_ram_bank(), 0);
        assert!(cam.is_ram_enabled());
        assert_eq!(cam.read(0xC000), 0xFF);
    }

    #[test]
    fn test_capture_through_the_bus() {
        let mut cam = camera_with_gray(128);
        enter_register_mode(&mut cam);
        cam.write(0xA002, 0x01);
        cam.write(0xA003, 0x00);
        for cell in 0..16u16 {
            let base = 0xA006 + cell * 3;
            cam.write(base, 50);
            cam.write(base + 1, 100);
            cam.write(base + 2, 150);
        }

        cam.write(0xA000, 0x01);
        assert!(cam.is_capture_dirty());
        assert!(cam.is_ram_dirty());
        assert_eq!(cam.read(0xA000), 0x00);

        // The ROM reads the picture back through RAM bank 0.
        cam.write(0x4000, 0x00);
        cam.write(0x0000, 0x0A);
        assert_eq!(cam.read(0xA100), 0xFF);
        assert_eq!(cam.read(0xA101), 0x00);
        assert_eq!(cam.read(0xAEFE), 0xFF);
        assert_eq!(cam.read(0xAEFF), 0x00);
        assert_eq!(cam.capture_sram().len(), CAPTURE_BYTES);

        let rgba = cam.decode_photo(0);
        assert!(rgba.chunks(4).all(|px| px == [0xAA, 0xAA, 0xAA, 0xFF]));
    }

    #[test]
    fn test_raw_mode_through_the_bus() {
        let mut cam = camera_with_gray(85);
        cam.set_capture_mode(CaptureMode::Raw);
        enter_register_mode(&mut cam);
        cam.write(0xA000, 0x07);
        assert_eq!(cam.state().registers[0], 0x06);
        assert!(cam.capture_sram().chunks(2).all(|row| row == [0x00, 0xFF]));
    }

    #[test]
    fn test_unsupported_frame_is_not_a_capture() {
        init_logger();
        let mut cam = camera();
        let mut image = StillImage::new();
        image.set_frame(&[0; 64], 8, crate::color::ColorFormat::Rgb8);
        cam.attach_image_source(image);
        cam.load_ram(&[0xAB; 0x2000]);

        enter_register_mode(&mut cam);
        cam.write(0xA000, 0x01);
        assert!(!cam.is_capture_dirty());
        assert!(cam.is_ram_dirty());
        assert!(cam.capture_sram().iter().all(|&b| b == 0));
        assert_eq!(cam.ram_data()[0x00FF], 0xAB);
    }

    #[test]
    fn test_direct_ram_write_bypasses_registers() {
        let mut cam = camera();
        cam.write(0x0000, 0x0A);
        cam.write(0xA000, 0x01);
        assert_eq!(cam.ram_data()[0], 0x01);
        assert_eq!(cam.state().registers[0], 0x00);
        assert!(!cam.is_capture_dirty());
    }

    #[derive(Default)]
    struct CountingSource {
        started: u32,
        stopped: u32,
        requests: u32,
        frame: Vec<u8>,
    }

    impl ImageSource for CountingSource {
        fn request_image(&mut self) -> Option<crate::image::Frame<'_>> {
            self.requests += 1;
            Some(crate::image::Frame::new(
                &self.frame,
                CAMERA_WIDTH,
                crate::color::ColorFormat::L8,
            ))
        }

        fn start(&mut self, width: usize, height: usize) {
            assert_eq!((width, height), (CAMERA_WIDTH, CAMERA_HEIGHT));
            self.started += 1;
        }

        fn stop(&mut self) {
            self.stopped += 1;
        }
    }

    #[test]
    fn test_source_lifecycle_and_single_request() {
        let mut cam = PocketCamera::<CountingSource>::from_rom(camera_rom()).unwrap();
        cam.attach_image_source(CountingSource {
            frame: vec![255; CAMERA_WIDTH * CAMERA_HEIGHT],
            ..CountingSource::default()
        });
        enter_register_mode(&mut cam);
        cam.write(0xA000, 0x01);

        let source = cam.detach_image_source().unwrap();
        assert_eq!(source.started, 1);
        assert_eq!(source.stopped, 1);
        assert_eq!(source.requests, 1);
        assert!(cam.detach_image_source().is_none());
    }

    #[test]
    fn test_boxed_sources() {
        let mut cam = PocketCamera::<Box<dyn ImageSource>>::from_rom(camera_rom()).unwrap();
        let mut image = StillImage::new();
        image.set_grayscale(&[0; CAMERA_WIDTH * CAMERA_HEIGHT]);
        cam.attach_image_source(Box::new(image));
        enter_register_mode(&mut cam);
        cam.write(0xA000, 0x01);
        assert!(cam.is_capture_dirty());
    }
}
