//! Memory-mapped device support for the 65el02.
//!
//! The [`Bus`] owns every device attached to the address space plus the
//! [`RedBus`] controller. Each access is routed in two steps:
//!
//! 1. If the RedBus window is mapped and contains the address, the access goes
//!    to the active RedBus peripheral.
//! 2. Otherwise the device with the greatest start address not above the
//!    target is selected by binary search. Addresses before the first device
//!    or past the end of the selected one raise [`BusError::MemoryFault`].
//!
//! # Example
//!
//! ```rust
//! use lib65el02::{Bus, CpuConfig, RamDevice, RomDevice, CPU};
//!
//! let mut bus = Bus::new();
//! bus.add_device(0x0000, Box::new(RamDevice::new(0x4000))).unwrap();
//! bus.add_device(0xC000, Box::new(RomDevice::new(vec![0xEA; 0x4000]))).unwrap();
//!
//! assert!(bus.read(0x8000, true).is_err());
//! let cpu = CPU::new(bus, CpuConfig::default());
//! ```

use std::any::Any;
use std::fmt;

use crate::memory::MemoryBus;

pub mod acia;
pub mod ram;
pub mod redbus;
pub mod rom;

pub use acia::{Acia6551, AciaHandle};
pub use ram::RamDevice;
pub use redbus::{Peripheral, RedBus};
pub use rom::RomDevice;

/// Default number of devices a bus accepts.
pub const DEFAULT_BUS_CAPACITY: usize = 16;

/// Direction of a faulting bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusAccess {
    Read,
    Write,
}

impl fmt::Display for BusAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusAccess::Read => f.write_str("READ"),
            BusAccess::Write => f.write_str("WRITE"),
        }
    }
}

/// Errors raised by the bus and its devices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// No device covers the address.
    #[error("memory could not be {access} at 0x{address:04X} (nearest device: {device})")]
    MemoryFault {
        access: BusAccess,
        address: u16,
        device: String,
    },

    /// A privileged-only register was read without privilege.
    #[error("access violation in {device} at offset 0x{offset:04X}")]
    AccessViolation { device: String, offset: u16 },

    /// The device table is full.
    #[error("bus capacity of {capacity} devices exceeded")]
    Capacity { capacity: usize },

    /// The new device's range collides with an existing device.
    #[error("device range 0x{start:04X}-0x{end:04X} overlaps {existing}")]
    Overlap {
        start: u16,
        end: u16,
        existing: String,
    },
}

/// Trait for memory-mapped hardware components.
///
/// Offsets are relative to the device's start address, so a device mapped at
/// 0x8800 sees an access to 0x8801 as offset 1. Devices must be `Send` so a
/// whole machine can move to a dedicated thread.
///
/// # Examples
///
/// ```
/// use std::any::Any;
/// use lib65el02::{BusError, Device};
///
/// struct Latch {
///     value: u8,
/// }
///
/// impl Device for Latch {
///     fn read(&mut self, _offset: u16, _privileged: bool) -> Result<u8, BusError> {
///         Ok(self.value)
///     }
///     fn write(&mut self, _offset: u16, value: u8) -> Result<(), BusError> {
///         self.value = value;
///         Ok(())
///     }
///     fn peek(&self, _offset: u16) -> u8 {
///         self.value
///     }
///     fn size(&self) -> u32 {
///         1
///     }
///     fn name(&self) -> &str {
///         "latch"
///     }
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
/// ```
pub trait Device: Send {
    /// Reads a byte at `offset`. `privileged` is set for CPU-internal accesses.
    fn read(&mut self, offset: u16, privileged: bool) -> Result<u8, BusError>;

    /// Writes a byte at `offset`.
    fn write(&mut self, offset: u16, value: u8) -> Result<(), BusError>;

    /// Reads a byte at `offset` without side effects.
    fn peek(&self, offset: u16) -> u8;

    /// Number of bytes of address space the device occupies (up to 0x10000).
    fn size(&self) -> u32;

    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Whether the device is asserting the IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A device bound to its address range.
struct DeviceMapping {
    start: u16,
    end: u16,
    device: Box<dyn Device>,
}

/// Capacity-bounded device registry with RedBus routing.
pub struct Bus {
    mappings: Vec<DeviceMapping>,
    capacity: usize,
    redbus: RedBus,
}

impl Bus {
    /// Creates an empty bus accepting [`DEFAULT_BUS_CAPACITY`] devices.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    /// Creates an empty bus accepting at most `capacity` devices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            mappings: Vec::with_capacity(capacity),
            capacity,
            redbus: RedBus::new(),
        }
    }

    /// Maximum number of devices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of attached devices.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Attaches a device at `start`.
    ///
    /// The device occupies `start ..= start + size - 1`, clipped at 0xFFFF.
    ///
    /// # Errors
    ///
    /// - [`BusError::Capacity`] when the bus is full
    /// - [`BusError::Overlap`] when the range collides with an existing device
    pub fn add_device(&mut self, start: u16, device: Box<dyn Device>) -> Result<(), BusError> {
        if self.mappings.len() >= self.capacity {
            return Err(BusError::Capacity {
                capacity: self.capacity,
            });
        }

        let size = device.size().clamp(1, 0x10000);
        let end = u32::from(start).saturating_add(size - 1).min(0xFFFF) as u16;

        if let Some(existing) = self
            .mappings
            .iter()
            .find(|m| start <= m.end && end >= m.start)
        {
            return Err(BusError::Overlap {
                start,
                end,
                existing: existing.device.name().to_string(),
            });
        }

        log::debug!(
            "bus: attached {} at 0x{:04X}-0x{:04X}",
            device.name(),
            start,
            end
        );

        let index = self.mappings.partition_point(|m| m.start < start);
        self.mappings.insert(index, DeviceMapping { start, end, device });
        Ok(())
    }

    /// Index of the mapping owning `address`, or the name of the nearest
    /// device when none does.
    fn locate(&self, address: u16) -> Result<usize, String> {
        let index = self.mappings.partition_point(|m| m.start <= address);
        if index == 0 {
            return Err(self
                .mappings
                .first()
                .map(|m| m.device.name().to_string())
                .unwrap_or_else(|| "none".to_string()));
        }
        let mapping = &self.mappings[index - 1];
        if address > mapping.end {
            return Err(mapping.device.name().to_string());
        }
        Ok(index - 1)
    }

    /// Reads a byte from `address`.
    pub fn read(&mut self, address: u16, privileged: bool) -> Result<u8, BusError> {
        if self.redbus.in_range(address) {
            return Ok(self.redbus.read(address));
        }
        match self.locate(address) {
            Ok(index) => {
                let mapping = &mut self.mappings[index];
                mapping.device.read(address - mapping.start, privileged)
            }
            Err(device) => Err(BusError::MemoryFault {
                access: BusAccess::Read,
                address,
                device,
            }),
        }
    }

    /// Writes a byte to `address`.
    pub fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        if self.redbus.in_range(address) {
            self.redbus.write(address, value);
            return Ok(());
        }
        match self.locate(address) {
            Ok(index) => {
                let mapping = &mut self.mappings[index];
                mapping.device.write(address - mapping.start, value)
            }
            Err(device) => Err(BusError::MemoryFault {
                access: BusAccess::Write,
                address,
                device,
            }),
        }
    }

    /// Reads a byte without side effects; `None` when nothing is mapped.
    pub fn peek(&self, address: u16) -> Option<u8> {
        if self.redbus.in_range(address) {
            return Some(self.redbus.peek(address));
        }
        let index = self.locate(address).ok()?;
        let mapping = &self.mappings[index];
        Some(mapping.device.peek(address - mapping.start))
    }

    /// Ticks the active RedBus peripheral.
    pub fn update(&mut self) {
        self.redbus.update();
    }

    /// Whether any attached device has an IRQ pending.
    pub fn irq_active(&self) -> bool {
        self.mappings.iter().any(|m| m.device.irq_pending())
    }

    /// Iterates `(start, end, name)` for every device in address order.
    pub fn devices(&self) -> impl Iterator<Item = (u16, u16, &str)> + '_ {
        self.mappings
            .iter()
            .map(|m| (m.start, m.end, m.device.name()))
    }

    /// Typed access to the device mapped at `start`.
    pub fn device<T: Device + 'static>(&self, start: u16) -> Option<&T> {
        self.mappings
            .iter()
            .find(|m| m.start == start)
            .and_then(|m| m.device.as_any().downcast_ref::<T>())
    }

    /// Typed mutable access to the device mapped at `start`.
    pub fn device_mut<T: Device + 'static>(&mut self, start: u16) -> Option<&mut T> {
        self.mappings
            .iter_mut()
            .find(|m| m.start == start)
            .and_then(|m| m.device.as_any_mut().downcast_mut::<T>())
    }

    pub fn redbus(&self) -> &RedBus {
        &self.redbus
    }

    pub fn redbus_mut(&mut self) -> &mut RedBus {
        &mut self.redbus
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for Bus {
    fn read(&mut self, addr: u16, privileged: bool) -> Result<u8, BusError> {
        Bus::read(self, addr, privileged)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        Bus::write(self, addr, value)
    }

    fn peek(&self, addr: u16) -> u8 {
        Bus::peek(self, addr).unwrap_or(0)
    }

    fn update(&mut self) {
        Bus::update(self)
    }

    fn irq_active(&self) -> bool {
        Bus::irq_active(self)
    }

    fn redbus(&self) -> Option<&RedBus> {
        Some(&self.redbus)
    }

    fn redbus_mut(&mut self) -> Option<&mut RedBus> {
        Some(&mut self.redbus)
    }
}
