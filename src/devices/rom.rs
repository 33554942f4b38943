//! ROM device implementation.
//!
//! Read-only storage: CPU writes are silently ignored.

use std::any::Any;

use super::{BusError, Device};

pub struct RomDevice {
    data: Vec<u8>,
}

impl RomDevice {
    /// Wraps `data` as ROM. Images longer than 0x10000 bytes are truncated.
    pub fn new(mut data: Vec<u8>) -> Self {
        data.truncate(0x10000);
        Self { data }
    }
}

impl Device for RomDevice {
    fn read(&mut self, offset: u16, _privileged: bool) -> Result<u8, BusError> {
        Ok(self.peek(offset))
    }

    fn write(&mut self, _offset: u16, _value: u8) -> Result<(), BusError> {
        Ok(())
    }

    fn peek(&self, offset: u16) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    fn size(&self) -> u32 {
        self.data.len() as u32
    }

    fn name(&self) -> &str {
        "ROM"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_read() {
        let mut rom = RomDevice::new(vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(rom.size(), 4);
        assert_eq!(rom.read(0, true), Ok(0x01));
        assert_eq!(rom.read(3, true), Ok(0x04));
    }

    #[test]
    fn test_rom_write_ignored() {
        let mut rom = RomDevice::new(vec![0xAA; 16]);
        rom.write(0, 0x55).unwrap();
        assert_eq!(rom.peek(0), 0xAA);
    }
}
