//! RedBus peripheral controller.
//!
//! RedBus multiplexes up to 256 peripherals through a single 256-byte window
//! in the CPU address space. The window is unmapped until software relocates
//! it with `MMU #$01`; the active peripheral is selected with `MMU #$00`.
//! Accesses that fall inside the window take precedence over every device on
//! the bus.

use std::fmt;

/// Number of bytes covered by the RedBus window.
pub const REDBUS_WINDOW_SIZE: u32 = 0x100;

/// A peripheral reachable through the RedBus window.
///
/// Offsets are relative to the window start.
pub trait Peripheral: Send {
    fn read(&mut self, offset: u8) -> u8;

    fn write(&mut self, offset: u8, value: u8);

    /// Called once per CPU step while this peripheral is active.
    fn update(&mut self);

    /// Side-effect-free read for lookahead and diagnostics.
    fn peek(&self, _offset: u8) -> u8 {
        0
    }
}

/// The RedBus controller: a relocatable window plus an active peripheral index.
pub struct RedBus {
    peripherals: Vec<Option<Box<dyn Peripheral>>>,
    window: Option<u16>,
    active_id: u8,
    enabled: bool,
    memory_window: u16,
    window_enabled: bool,
}

impl RedBus {
    /// Creates a disabled controller with an unmapped window and no peripherals.
    pub fn new() -> Self {
        Self {
            peripherals: (0..256).map(|_| None).collect(),
            window: None,
            active_id: 0,
            enabled: false,
            memory_window: 0,
            window_enabled: false,
        }
    }

    // ========== MMU Surface ==========

    pub fn set_active_device_id(&mut self, id: u8) {
        self.active_id = id;
    }

    pub fn active_device_id(&self) -> u8 {
        self.active_id
    }

    /// Maps the window at `offset ..= offset + 0xFF`.
    pub fn set_window_offset(&mut self, offset: u16) {
        log::debug!("redbus: window mapped at 0x{:04X}", offset);
        self.window = Some(offset);
    }

    /// Start of the window, or `None` while unmapped.
    pub fn window_offset(&self) -> Option<u16> {
        self.window
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_memory_window(&mut self, address: u16) {
        self.memory_window = address;
    }

    pub fn memory_window(&self) -> u16 {
        self.memory_window
    }

    pub fn set_window_enabled(&mut self, enabled: bool) {
        self.window_enabled = enabled;
    }

    pub fn window_enabled(&self) -> bool {
        self.window_enabled
    }

    /// Installs a peripheral in slot `id`, replacing any previous occupant.
    pub fn set_peripheral(&mut self, id: u8, peripheral: Box<dyn Peripheral>) {
        self.peripherals[id as usize] = Some(peripheral);
    }

    /// Removes and returns the peripheral in slot `id`.
    pub fn take_peripheral(&mut self, id: u8) -> Option<Box<dyn Peripheral>> {
        self.peripherals[id as usize].take()
    }

    // ========== Routing ==========

    /// Whether `address` falls inside the mapped window.
    pub fn in_range(&self, address: u16) -> bool {
        match self.window {
            Some(start) => {
                let start = u32::from(start);
                let address = u32::from(address);
                address >= start && address < start + REDBUS_WINDOW_SIZE
            }
            None => false,
        }
    }

    fn offset(&self, address: u16) -> u8 {
        address.wrapping_sub(self.window.unwrap_or(0)) as u8
    }

    fn active(&mut self) -> Option<&mut Box<dyn Peripheral>> {
        self.peripherals[self.active_id as usize].as_mut()
    }

    /// Reads through the window. Disabled controllers and empty slots read 0.
    pub fn read(&mut self, address: u16) -> u8 {
        if !self.enabled {
            return 0;
        }
        let offset = self.offset(address);
        self.active().map(|p| p.read(offset)).unwrap_or(0)
    }

    /// Writes through the window. Ignored while disabled.
    pub fn write(&mut self, address: u16, value: u8) {
        if !self.enabled {
            return;
        }
        let offset = self.offset(address);
        if let Some(peripheral) = self.active() {
            peripheral.write(offset, value);
        }
    }

    pub fn peek(&self, address: u16) -> u8 {
        if !self.enabled {
            return 0;
        }
        self.peripherals[self.active_id as usize]
            .as_ref()
            .map(|p| p.peek(self.offset(address)))
            .unwrap_or(0)
    }

    /// Ticks the active peripheral.
    pub fn update(&mut self) {
        if let Some(peripheral) = self.active() {
            peripheral.update();
        }
    }
}

impl Default for RedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RedBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedBus")
            .field("window", &self.window)
            .field("active_id", &self.active_id)
            .field("enabled", &self.enabled)
            .field("memory_window", &self.memory_window)
            .field("window_enabled", &self.window_enabled)
            .finish()
    }
}
