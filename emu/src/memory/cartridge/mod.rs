//! Cartridge abstraction: the bus-facing `Cartridge` trait and the Pocket
//! Camera controller behind it.
//!
//! The host routes 0x0000-0x7FFF and 0xA000-0xBFFF accesses through
//! [`Cartridge::read`] and [`Cartridge::write`]; everything else on the bus is
//! none of the cartridge's business.

mod camera;

pub use camera::{PocketCamera, read_control, write_control};

/// Abstraction over cartridge hardware (ROM chips + controller + RAM).
pub trait Cartridge {
    /// Bus read from 0x0000-0x7FFF or 0xA000-0xBFFF.
    fn read(&self, addr: u16) -> u8;
    /// Bus write to 0x0000-0x7FFF or 0xA000-0xBFFF.
    fn write(&mut self, addr: u16, value: u8);
    /// Borrow the full cartridge RAM slice (for save data export).
    fn ram_data(&self) -> &[u8];
    /// Load save data into cartridge RAM (truncated if too long).
    fn load_ram(&mut self, data: &[u8]);
    /// Whether save data changed since the last `clear_ram_dirty`.
    fn is_ram_dirty(&self) -> bool;
    fn clear_ram_dirty(&mut self);
    /// Total number of 16KB ROM banks.
    fn rom_bank_count(&self) -> usize;
    /// Currently selected ROM bank (for debug).
    fn current_rom_bank(&self) -> usize {
        1
    }
    /// Currently selected RAM bank (for debug).
    fn current_ram_bank(&self) -> usize {
        0
    }
    /// Whether external RAM is enabled (for debug).
    fn is_ram_enabled(&self) -> bool {
        false
    }
}
