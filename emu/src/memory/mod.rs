//! Cartridge memory: ROM, battery-backed RAM and the bank-switch primitives
//! the Pocket Camera controller drives.
//!
//! [`CartMemory`] is the state the register interface mutates on every bus
//! write. It never decides *what* a write means; it only switches banks,
//! gates RAM access and tracks whether save data changed.

pub mod camera;
pub mod cartridge;

use crate::error::LoadError;
use crate::log::LogCategory;
use crate::log_warn;

pub const ROM_BANK_SIZE: usize = 0x4000; // 16KB
pub const RAM_BANK_SIZE: usize = 0x2000; // 8KB

/// Cartridge type byte (header 0x0147) of the Pocket Camera.
pub const POCKET_CAMERA_TYPE: u8 = 0xFC;

pub struct CartMemory {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_bank: usize,
    ram_bank: usize,
    ram_enabled: bool,
    direct_ram_access: bool,
    ram_dirty: bool,
}

impl CartMemory {
    pub fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        CartMemory {
            rom,
            ram: vec![0; ram_size],
            rom_bank: 1,
            ram_bank: 0,
            ram_enabled: false,
            direct_ram_access: true,
            ram_dirty: false,
        }
    }

    pub fn rom_bank_count(&self) -> usize {
        (self.rom.len() / ROM_BANK_SIZE).max(1)
    }

    pub fn ram_bank_count(&self) -> usize {
        self.ram.len().div_ceil(RAM_BANK_SIZE)
    }

    /// Map ROM bank `bank` at 0x4000-0x7FFF. Banks past the end of the ROM
    /// wrap around.
    pub fn switch_rom_bank(&mut self, bank: usize) {
        let count = self.rom_bank_count();
        if bank >= count {
            log_warn!(
                LogCategory::Mbc,
                "Attempting to switch to an invalid ROM bank: {:02X} (of {})",
                bank,
                count
            );
        }
        self.rom_bank = bank % count;
    }

    /// Map RAM bank `bank` at 0xA000-0xBFFF. Returns `false`, leaving the
    /// current mapping untouched, when the cartridge has no RAM.
    pub fn switch_ram_bank(&mut self, bank: usize) -> bool {
        let count = self.ram_bank_count();
        if count == 0 {
            log_warn!(LogCategory::Mbc, "No cartridge RAM to map bank {:02X}", bank);
            return false;
        }
        if bank >= count {
            log_warn!(
                LogCategory::Mbc,
                "Attempting to switch to an invalid RAM bank: {:02X} (of {})",
                bank,
                count
            );
        }
        self.ram_bank = bank % count;
        true
    }

    pub fn rom_bank(&self) -> usize {
        self.rom_bank
    }

    pub fn ram_bank(&self) -> usize {
        self.ram_bank
    }

    pub fn is_ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    pub fn set_ram_enabled(&mut self, enabled: bool) {
        self.ram_enabled = enabled;
    }

    pub fn has_direct_ram_access(&self) -> bool {
        self.direct_ram_access
    }

    pub fn set_direct_ram_access(&mut self, direct: bool) {
        self.direct_ram_access = direct;
    }

    /// Whether 0xA000-0xBFFF writes land in RAM rather than the controller.
    pub fn is_ram_mapped(&self) -> bool {
        self.ram_enabled && self.direct_ram_access && !self.ram.is_empty()
    }

    pub fn read_rom(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            0x4000..=0x7FFF => {
                let offset = self.rom_bank * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            _ => 0xFF,
        }
    }

    fn ram_offset(&self, addr: u16) -> usize {
        self.ram_bank * RAM_BANK_SIZE + (addr as usize & (RAM_BANK_SIZE - 1))
    }

    /// Read the mapped RAM bank. Reads ignore the enable flag; only writes
    /// are gated. Missing RAM reads as open bus (0xFF).
    pub fn read_ram(&self, addr: u16) -> u8 {
        self.ram.get(self.ram_offset(addr)).copied().unwrap_or(0xFF)
    }

    /// Write the mapped RAM bank. Dropped while RAM is disabled.
    pub fn write_ram(&mut self, addr: u16, value: u8) {
        if !self.ram_enabled {
            return;
        }
        let offset = self.ram_offset(addr);
        if let Some(byte) = self.ram.get_mut(offset) {
            *byte = value;
            self.ram_dirty = true;
        }
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }

    /// Load save data into cartridge RAM (truncated if too long).
    pub fn load_ram(&mut self, data: &[u8]) {
        let len = data.len().min(self.ram.len());
        self.ram[..len].copy_from_slice(&data[..len]);
        self.ram_dirty = false;
    }

    pub fn mark_ram_dirty(&mut self) {
        self.ram_dirty = true;
    }

    pub fn is_ram_dirty(&self) -> bool {
        self.ram_dirty
    }

    pub fn clear_ram_dirty(&mut self) {
        self.ram_dirty = false;
    }
}

/// Determine RAM size from cartridge header byte 0x0149.
pub fn ram_size_from_header(byte: u8) -> usize {
    match byte {
        0x00 => 8 * 1024,   // Default 8KB (some games report 0 but have RAM)
        0x01 => 2 * 1024,   // 2KB (unofficial)
        0x02 => 8 * 1024,   // 8KB
        0x03 => 32 * 1024,  // 32KB (4 banks)
        0x04 => 128 * 1024, // 128KB (16 banks)
        0x05 => 64 * 1024,  // 64KB (8 banks)
        _ => 128 * 1024,
    }
}

/// Check that `rom` carries a Pocket Camera header.
pub fn check_header(rom: &[u8]) -> Result<(), LoadError> {
    if rom.len() < 0x150 {
        return Err(LoadError::RomTooSmall(rom.len()));
    }
    match rom[0x0147] {
        POCKET_CAMERA_TYPE => Ok(()),
        other => Err(LoadError::NotPocketCamera(other)),
    }
}
