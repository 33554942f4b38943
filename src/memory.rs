//! # Memory Bus Abstraction
//!
//! The `MemoryBus` trait decouples the CPU from the memory system it runs
//! against. Two implementations ship with the crate:
//!
//! - [`FlatMemory`]: 64KB of RAM that never faults, convenient for tests
//! - [`Bus`](crate::Bus): a device registry with RedBus routing
//!
//! ## Design Principles
//!
//! - Accesses are fallible: an unmapped address or a privileged register
//!   touched without privilege surfaces as a [`BusError`]
//! - `peek` is a side-effect-free read used for lookahead, traces and dumps
//! - MMU instructions reach the RedBus through `redbus_mut`; memory systems
//!   without one simply ignore them

use crate::devices::redbus::RedBus;
use crate::devices::BusError;

/// Memory bus trait for CPU memory accesses.
///
/// # Examples
///
/// ```
/// use lib65el02::{FlatMemory, MemoryBus};
///
/// let mut mem = FlatMemory::new();
/// mem.write(0x1234, 0x42).unwrap();
/// assert_eq!(mem.read(0x1234, false).unwrap(), 0x42);
/// assert_eq!(mem.peek(0x1234), 0x42);
/// ```
///
/// ## Implementing Custom Memory
///
/// ```
/// use lib65el02::{BusAccess, BusError, MemoryBus};
///
/// struct LowRam {
///     ram: [u8; 0x1000],
/// }
///
/// impl MemoryBus for LowRam {
///     fn read(&mut self, addr: u16, _privileged: bool) -> Result<u8, BusError> {
///         self.ram.get(addr as usize).copied().ok_or(BusError::MemoryFault {
///             access: BusAccess::Read,
///             address: addr,
///             device: "low ram".to_string(),
///         })
///     }
///
///     fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
///         match self.ram.get_mut(addr as usize) {
///             Some(cell) => {
///                 *cell = value;
///                 Ok(())
///             }
///             None => Err(BusError::MemoryFault {
///                 access: BusAccess::Write,
///                 address: addr,
///                 device: "low ram".to_string(),
///             }),
///         }
///     }
///
///     fn peek(&self, addr: u16) -> u8 {
///         self.ram.get(addr as usize).copied().unwrap_or(0)
///     }
/// }
///
/// let mut mem = LowRam { ram: [0; 0x1000] };
/// assert!(mem.write(0x2000, 1).is_err());
/// ```
pub trait MemoryBus {
    /// Reads a byte.
    ///
    /// `privileged` is set for CPU-internal accesses (opcode and operand
    /// fetches, vector and pointer reads). Devices may refuse unprivileged
    /// reads of sensitive registers.
    fn read(&mut self, addr: u16, privileged: bool) -> Result<u8, BusError>;

    /// Writes a byte.
    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError>;

    /// Reads a byte without side effects. Unmapped addresses read as 0.
    fn peek(&self, addr: u16) -> u8;

    /// Advances time-driven peripherals by one CPU step.
    fn update(&mut self) {}

    /// Checks if any device is asserting the IRQ line.
    ///
    /// Level-sensitive: the line stays active until every device clears its
    /// request. The default has no interrupt sources.
    fn irq_active(&self) -> bool {
        false
    }

    /// The RedBus controller, if this memory system has one.
    fn redbus(&self) -> Option<&RedBus> {
        None
    }

    /// Mutable access to the RedBus controller for MMU instructions.
    fn redbus_mut(&mut self) -> Option<&mut RedBus> {
        None
    }
}

/// Simple 64KB flat memory.
///
/// Every address is writable RAM initialised to zero and no access ever
/// faults.
pub struct FlatMemory {
    data: Box<[u8; 65536]>,
}

impl FlatMemory {
    /// Creates a new FlatMemory instance with all bytes initialized to zero.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 65536]),
        }
    }

    /// Copies `bytes` into memory starting at `start`, wrapping at 0xFFFF.
    ///
    /// # Examples
    ///
    /// ```
    /// use lib65el02::{FlatMemory, MemoryBus};
    ///
    /// let mut mem = FlatMemory::new();
    /// mem.load(0xFFFE, &[0x11, 0x22, 0x33]);
    /// assert_eq!(mem.peek(0xFFFF), 0x22);
    /// assert_eq!(mem.peek(0x0000), 0x33);
    /// ```
    pub fn load(&mut self, start: u16, bytes: &[u8]) {
        let mut addr = start;
        for &byte in bytes {
            self.data[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&mut self, addr: u16, _privileged: bool) -> Result<u8, BusError> {
        Ok(self.data[addr as usize])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        self.data[addr as usize] = value;
        Ok(())
    }

    fn peek(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_memory_read_write() {
        let mut mem = FlatMemory::new();
        assert_eq!(mem.read(0x0000, false), Ok(0x00));

        mem.write(0x1234, 0x42).unwrap();
        assert_eq!(mem.read(0x1234, false), Ok(0x42));
        assert_eq!(mem.peek(0x1233), 0x00);
        assert_eq!(mem.peek(0x1235), 0x00);
    }

    #[test]
    fn test_flat_memory_has_no_redbus() {
        let mut mem = FlatMemory::new();
        assert!(mem.redbus().is_none());
        assert!(mem.redbus_mut().is_none());
        assert!(!mem.irq_active());
    }
}
