//! RAM device implementation.
//!
//! Provides readable and writable memory storage via the Device trait.

use std::any::Any;

use super::{BusError, Device};

/// Random-access memory of a fixed size.
///
/// # Examples
///
/// ```
/// use lib65el02::{Device, RamDevice};
///
/// let mut ram = RamDevice::new(0x2000);
/// ram.write(0x10, 0x42).unwrap();
/// assert_eq!(ram.read(0x10, false).unwrap(), 0x42);
/// assert_eq!(ram.size(), 0x2000);
/// ```
pub struct RamDevice {
    data: Vec<u8>,
}

impl RamDevice {
    /// Creates zero-filled RAM of `size` bytes (at most 0x10000).
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size.min(0x10000)],
        }
    }

    /// Copies `bytes` into RAM at `offset`, truncating at the end of the device.
    ///
    /// Returns the number of bytes copied.
    pub fn load_bytes(&mut self, offset: usize, bytes: &[u8]) -> usize {
        if offset >= self.data.len() {
            return 0;
        }
        let count = bytes.len().min(self.data.len() - offset);
        self.data[offset..offset + count].copy_from_slice(&bytes[..count]);
        count
    }

    /// Zero-fills the device.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Device for RamDevice {
    fn read(&mut self, offset: u16, _privileged: bool) -> Result<u8, BusError> {
        Ok(self.peek(offset))
    }

    fn write(&mut self, offset: u16, value: u8) -> Result<(), BusError> {
        if let Some(cell) = self.data.get_mut(offset as usize) {
            *cell = value;
        }
        Ok(())
    }

    fn peek(&self, offset: u16) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    fn size(&self) -> u32 {
        self.data.len() as u32
    }

    fn name(&self) -> &str {
        "RAM"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
