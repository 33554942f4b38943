//! 6551 ACIA serial adapter.
//!
//! Four registers are exposed to the CPU:
//!
//! | Offset | Read                | Write                     |
//! |--------|---------------------|---------------------------|
//! | 0      | receive data        | transmit data             |
//! | 1      | status              | programmed reset          |
//! | 2      | command register    | command register          |
//! | 3      | control register    | control register / reset  |
//!
//! The device state lives behind an `Arc<Mutex<_>>` so a host thread can feed
//! received bytes and drain transmitted ones through an [`AciaHandle`] while
//! the CPU runs elsewhere.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{BusAccess, BusError, Device};

/// Number of registers.
pub const ACIA_SIZE: u32 = 4;

const DATA_REG: u16 = 0;
const STAT_REG: u16 = 1;
const CMND_REG: u16 = 2;
const CTRL_REG: u16 = 3;

const STATUS_OVERRUN: u8 = 0x04;
const STATUS_RX_FULL: u8 = 0x08;
const STATUS_TX_EMPTY: u8 = 0x10;
const STATUS_IRQ: u8 = 0x80;

const RX_CAPACITY: usize = 256;

/// Baud rates selected by the low nibble of the control register.
const BAUD_RATES: [u32; 16] = [
    0, 50, 75, 110, 135, 150, 300, 600, 1200, 1800, 2400, 3600, 4800, 7200, 9600, 19200,
];

#[derive(Debug, Default)]
struct AciaState {
    rx: VecDeque<u8>,
    last_rx: u8,
    tx: VecDeque<u8>,
    tx_empty: bool,
    overrun: bool,
    interrupt: bool,
    receive_irq_enabled: bool,
    transmit_irq_enabled: bool,
    command: u8,
    control: u8,
    baud_rate: u32,
    last_rx_read: Option<Instant>,
    last_tx_write: Option<Instant>,
}

impl AciaState {
    fn new() -> Self {
        Self {
            tx_empty: true,
            ..Self::default()
        }
    }

    fn reset(&mut self) {
        self.rx.clear();
        self.last_rx = 0;
        self.tx_empty = true;
        self.overrun = false;
        self.interrupt = false;
        self.receive_irq_enabled = false;
        self.transmit_irq_enabled = false;
    }

    /// Approximate time to shift one 8-bit character at the current rate.
    fn char_delay(&self) -> Duration {
        if self.baud_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(8_000_000_000 / u64::from(self.baud_rate))
        }
    }

    fn settled(&self, since: Option<Instant>) -> bool {
        let delay = self.char_delay();
        delay.is_zero() || since.map_or(true, |t| t.elapsed() >= delay)
    }

    fn stamp(&self) -> Option<Instant> {
        if self.char_delay().is_zero() {
            None
        } else {
            Some(Instant::now())
        }
    }

    fn status(&self) -> u8 {
        let mut status = 0;
        if !self.rx.is_empty() && self.settled(self.last_rx_read) {
            status |= STATUS_RX_FULL;
        }
        if self.tx_empty && self.settled(self.last_tx_write) {
            status |= STATUS_TX_EMPTY;
        }
        if self.overrun {
            status |= STATUS_OVERRUN;
        }
        if self.interrupt {
            status |= STATUS_IRQ;
        }
        status
    }

    fn set_command(&mut self, value: u8) {
        self.command = value;
        self.receive_irq_enabled = value & 0x02 == 0;
        self.transmit_irq_enabled = value & 0x08 == 0 && value & 0x04 != 0;
    }

    fn set_control(&mut self, value: u8) {
        self.control = value;
        if value == 0 {
            self.reset();
        } else {
            self.baud_rate = BAUD_RATES[(value & 0x0F) as usize];
        }
    }

    fn receive(&mut self, byte: u8) {
        if self.rx.len() >= RX_CAPACITY {
            self.overrun = true;
            self.rx.pop_front();
        }
        self.rx.push_back(byte);
        if self.receive_irq_enabled {
            self.interrupt = true;
        }
    }

    fn transmit(&mut self, byte: u8) {
        self.last_tx_write = self.stamp();
        self.tx.push_back(byte);
        self.tx_empty = false;
    }

    fn drain_tx(&mut self) -> Vec<u8> {
        let bytes: Vec<u8> = self.tx.drain(..).collect();
        if !bytes.is_empty() {
            self.tx_empty = true;
            if self.transmit_irq_enabled {
                self.interrupt = true;
            }
        }
        bytes
    }
}

fn lock(state: &Mutex<AciaState>) -> MutexGuard<'_, AciaState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Memory-mapped 6551 ACIA.
///
/// # Examples
///
/// ```
/// use lib65el02::{Acia6551, Device};
///
/// let mut acia = Acia6551::new();
/// let host = acia.handle();
///
/// host.receive(b'A');
/// assert_eq!(acia.read(1, true).unwrap() & 0x08, 0x08);
/// assert_eq!(acia.read(0, true).unwrap(), b'A');
///
/// acia.write(0, b'Z').unwrap();
/// assert_eq!(host.take_transmitted(), vec![b'Z']);
/// ```
#[derive(Debug)]
pub struct Acia6551 {
    state: Arc<Mutex<AciaState>>,
}

/// Host-side handle to an [`Acia6551`], cloneable and usable from any thread.
#[derive(Debug, Clone)]
pub struct AciaHandle {
    state: Arc<Mutex<AciaState>>,
}

impl Acia6551 {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AciaState::new())),
        }
    }

    /// Returns a handle sharing this device's state.
    pub fn handle(&self) -> AciaHandle {
        AciaHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Current baud rate selected by the control register.
    pub fn baud_rate(&self) -> u32 {
        lock(&self.state).baud_rate
    }
}

impl Default for Acia6551 {
    fn default() -> Self {
        Self::new()
    }
}

impl AciaHandle {
    /// Delivers a byte to the receive buffer, as if it arrived on the line.
    ///
    /// When the buffer is full the oldest byte is dropped and the overrun
    /// flag is raised.
    pub fn receive(&self, byte: u8) {
        lock(&self.state).receive(byte);
    }

    /// Delivers every byte of `bytes` in order.
    pub fn receive_all(&self, bytes: &[u8]) {
        let mut state = lock(&self.state);
        for &byte in bytes {
            state.receive(byte);
        }
    }

    /// Drains the bytes the CPU has transmitted.
    pub fn take_transmitted(&self) -> Vec<u8> {
        lock(&self.state).drain_tx()
    }

    /// Whether the CPU has transmitted bytes that have not been drained.
    pub fn has_transmitted(&self) -> bool {
        !lock(&self.state).tx.is_empty()
    }

    /// Whether received bytes are waiting for the CPU.
    pub fn has_received(&self) -> bool {
        !lock(&self.state).rx.is_empty()
    }
}

impl Device for Acia6551 {
    fn read(&mut self, offset: u16, privileged: bool) -> Result<u8, BusError> {
        let mut state = lock(&self.state);
        match offset {
            DATA_REG => {
                if !privileged {
                    return Err(BusError::AccessViolation {
                        device: self.name().to_string(),
                        offset,
                    });
                }
                state.last_rx_read = state.stamp();
                state.overrun = false;
                if let Some(byte) = state.rx.pop_front() {
                    state.last_rx = byte;
                }
                Ok(state.last_rx)
            }
            STAT_REG => {
                let status = state.status();
                if privileged {
                    state.interrupt = false;
                }
                Ok(status)
            }
            CMND_REG => Ok(state.command),
            CTRL_REG => Ok(state.control),
            _ => Err(BusError::MemoryFault {
                access: BusAccess::Read,
                address: offset,
                device: self.name().to_string(),
            }),
        }
    }

    fn write(&mut self, offset: u16, value: u8) -> Result<(), BusError> {
        let mut state = lock(&self.state);
        match offset {
            DATA_REG => state.transmit(value),
            STAT_REG => {
                log::debug!("acia: programmed reset");
                state.reset();
            }
            CMND_REG => state.set_command(value),
            CTRL_REG => state.set_control(value),
            _ => {
                return Err(BusError::MemoryFault {
                    access: BusAccess::Write,
                    address: offset,
                    device: self.name().to_string(),
                })
            }
        }
        Ok(())
    }

    fn peek(&self, offset: u16) -> u8 {
        let state = lock(&self.state);
        match offset {
            DATA_REG => state.rx.front().copied().unwrap_or(state.last_rx),
            STAT_REG => state.status(),
            CMND_REG => state.command,
            CTRL_REG => state.control,
            _ => 0,
        }
    }

    fn size(&self) -> u32 {
        ACIA_SIZE
    }

    fn name(&self) -> &str {
        "ACIA"
    }

    fn irq_pending(&self) -> bool {
        lock(&self.state).interrupt
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
