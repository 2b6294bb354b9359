//! Save states for the Pocket Camera controller.
//!
//! Only controller state is captured here; cartridge RAM travels separately
//! as save data.

use serde_json::Value;

use crate::error::StateError;
use crate::image::ImageSource;
use crate::memory::camera::REGISTER_COUNT;
use crate::memory::cartridge::PocketCamera;

const SYSTEM: &str = "gb-pocketcam";
const VERSION: u64 = 1;

impl<S: ImageSource> PocketCamera<S> {
    pub fn save_state(&self) -> Value {
        serde_json::json!({
            "system": SYSTEM,
            "version": VERSION,
            "camera": {
                "registers_active": self.state.registers_active,
                "registers": self.state.registers.to_vec(),
            },
            "mbc": {
                "rom_bank": self.memory.rom_bank(),
                "ram_bank": self.memory.ram_bank(),
                "ram_enabled": self.memory.is_ram_enabled(),
                "direct_ram_access": self.memory.has_direct_ram_access(),
            }
        })
    }

    /// Restore controller state. Nothing is modified unless the whole state
    /// validates.
    pub fn load_state(&mut self, v: &Value) -> Result<(), StateError> {
        let system = v
            .get("system")
            .and_then(Value::as_str)
            .ok_or(StateError::MissingField("system"))?;
        if system != SYSTEM {
            return Err(StateError::WrongSystem(system.to_string()));
        }
        let version = v
            .get("version")
            .and_then(Value::as_u64)
            .ok_or(StateError::MissingField("version"))?;
        if version != VERSION {
            return Err(StateError::UnsupportedVersion(version));
        }

        let camera = v.get("camera").ok_or(StateError::MissingField("camera"))?;
        let registers_active = get_bool(camera, "registers_active")?;
        let bytes: Vec<u8> = serde_json::from_value(
            camera
                .get("registers")
                .cloned()
                .ok_or(StateError::MissingField("registers"))?,
        )?;
        let registers: [u8; REGISTER_COUNT] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| StateError::RegisterLength {
                    expected: REGISTER_COUNT,
                    actual: bytes.len(),
                })?;

        let mbc = v.get("mbc").ok_or(StateError::MissingField("mbc"))?;
        let rom_bank = get_usize(mbc, "rom_bank")?;
        let ram_bank = get_usize(mbc, "ram_bank")?;
        let ram_enabled = get_bool(mbc, "ram_enabled")?;
        let direct_ram_access = get_bool(mbc, "direct_ram_access")?;

        self.state.registers_active = registers_active;
        self.state.registers = registers;
        self.memory.switch_rom_bank(rom_bank);
        self.memory.switch_ram_bank(ram_bank);
        self.memory.set_ram_enabled(ram_enabled);
        self.memory.set_direct_ram_access(direct_ram_access);
        Ok(())
    }
}

fn get_bool(v: &Value, field: &'static str) -> Result<bool, StateError> {
    v.get(field)
        .and_then(Value::as_bool)
        .ok_or(StateError::MissingField(field))
}

fn get_usize(v: &Value, field: &'static str) -> Result<usize, StateError> {
    let value = v
        .get(field)
        .and_then(Value::as_u64)
        .ok_or(StateError::MissingField(field))?;
    usize::try_from(value).map_err(|_| StateError::OutOfRange { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::cartridge::Cartridge;
    use crate::memory::{POCKET_CAMERA_TYPE, ROM_BANK_SIZE};

    fn camera() -> PocketCamera {
        let mut rom = vec![0; 8 * ROM_BANK_SIZE];
        rom[0x0147] = POCKET_CAMERA_TYPE;
        rom[0x0149] = 0x04;
        PocketCamera::from_rom(rom).unwrap()
    }

    #[test]
    fn test_save_and_restore() {
        let mut cam = camera();
        cam.write(0x2000, 0x05);
        cam.write(0x0000, 0x0A);
        cam.write(0x4000, 0x10);
        cam.write(0xA002, 0x08);
        cam.write(0xA020, 0x7F);
        let saved = cam.save_state();

        let mut other = camera();
        other.load_state(&saved).unwrap();
        assert_eq!(other.state(), cam.state());
        assert_eq!(other.current_rom_bank(), 5);
        assert!(other.is_ram_enabled());
        assert!(!other.memory().has_direct_ram_access());
        assert_eq!(other.read(0xA000), cam.read(0xA000));

        // State survives a trip through text.
        let text = saved.to_string();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        let mut third = camera();
        third.load_state(&parsed).unwrap();
        assert_eq!(third.state().registers[0x20], 0x7F);
    }

    #[test]
    fn test_rejects_foreign_state() {
        let mut cam = camera();
        let mut state = cam.save_state();
        state["system"] = Value::from("gb");
        assert!(matches!(
            cam.load_state(&state),
            Err(StateError::WrongSystem(s)) if s == "gb"
        ));

        let mut state = cam.save_state();
        state["version"] = Value::from(9);
        assert!(matches!(
            cam.load_state(&state),
            Err(StateError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_rejects_bad_registers_without_side_effects() {
        let mut cam = camera();
        let mut state = cam.save_state();
        state["camera"]["registers"] = Value::from(vec![1u8; 10]);
        state["mbc"]["rom_bank"] = Value::from(3);
        assert!(matches!(
            cam.load_state(&state),
            Err(StateError::RegisterLength {
                expected: REGISTER_COUNT,
                actual: 10
            })
        ));
        assert_eq!(cam.current_rom_bank(), 1);

        let mut state = cam.save_state();
        state["mbc"].as_object_mut().unwrap().remove("ram_bank");
        assert!(matches!(
            cam.load_state(&state),
            Err(StateError::MissingField("ram_bank"))
        ));

        let mut state = cam.save_state();
        state["mbc"]["rom_bank"] = Value::from(u64::MAX);
        let result = cam.load_state(&state);
        if usize::BITS < 64 {
            assert!(matches!(
                result,
                Err(StateError::OutOfRange {
                    field: "rom_bank",
                    value: u64::MAX
                })
            ));
            assert_eq!(cam.current_rom_bank(), 1);
        }
        assert_eq!(
            get_usize(&serde_json::json!({ "bank": 7 }), "bank").unwrap(),
            7
        );

        let mut state = cam.save_state();
        state["camera"]["registers"] = Value::from("nope");
        assert!(matches!(cam.load_state(&state), Err(StateError::Json(_))));
    }
}
