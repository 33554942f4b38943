//! # Machine Driver
//!
//! A [`Machine`] owns a [`CPU`] over a [`Bus`] with RAM mapped at 0x0000 and
//! drives it one instruction at a time. After every step it ticks the RedBus
//! peripherals, honours STP and feeds device interrupts back to the CPU.
//!
//! When the run loop catches an error the machine stops and produces a
//! halt-and-dump diagnostic; it never restarts itself.
//!
//! ## Example
//!
//! ```rust
//! use lib65el02::{CpuConfig, Machine};
//!
//! let mut machine = Machine::new(CpuConfig::default().unthrottled(), 0x2000).unwrap();
//! // LDA #$07 ; STA $10 ; STP
//! machine.load_image(0x0400, &[0xA9, 0x07, 0x85, 0x10, 0xDB]).unwrap();
//! machine.run().unwrap();
//!
//! assert!(!machine.is_running());
//! assert_eq!(machine.bus().peek(0x0010), Some(0x07));
//! ```

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use crate::state::DEFAULT_POR;
use crate::trace::TraceEvent;
use crate::{Acia6551, AciaHandle, Bus, BusError, CpuConfig, Device, ExecutionError, RamDevice, CPU};

/// Drive ID written to 0x0000 on reset.
pub const DEFAULT_DRIVE_ID: u8 = 2;
/// Monitor ID written to 0x0001 on reset.
pub const DEFAULT_MONITOR_ID: u8 = 1;
/// Where the bootloader image is placed.
pub const BOOTLOADER_OFFSET: u16 = DEFAULT_POR;
/// Largest bootloader image.
pub const BOOTLOADER_MAX_LEN: usize = 0x100;
/// POR and BRK after warm-up.
pub const WARM_START: u16 = 0x2000;

/// Errors surfaced by the machine driver.
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("failed to read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image of {len} bytes at 0x{offset:04X} does not fit in {capacity} bytes of RAM")]
    ImageTooLarge {
        offset: u16,
        len: usize,
        capacity: usize,
    },
}

/// A runnable 65el02 system.
pub struct Machine {
    cpu: CPU<Bus>,
    ram_size: usize,
    running: bool,
}

impl Machine {
    /// Builds a machine with `ram_size` bytes of RAM at 0x0000, then resets
    /// and warms it up.
    ///
    /// # Errors
    ///
    /// Fails when the RAM device cannot be attached or the reset writes fault.
    pub fn new(config: CpuConfig, ram_size: usize) -> Result<Self, MachineError> {
        let ram_size = ram_size.min(0x10000);
        let mut bus = Bus::with_capacity(config.bus_capacity);
        bus.add_device(0x0000, Box::new(RamDevice::new(ram_size)))?;

        let mut machine = Self {
            cpu: CPU::new(bus, config),
            ram_size,
            running: false,
        };
        machine.reset()?;
        machine.warm_up();
        Ok(machine)
    }

    /// Stops the machine, resets the CPU and stores the default drive and
    /// monitor IDs in page zero. The machine stays idle until the next run.
    pub fn reset(&mut self) -> Result<(), MachineError> {
        self.running = false;
        self.cpu.reset();
        let bus = self.cpu.memory_mut();
        bus.write(0x0000, DEFAULT_DRIVE_ID)?;
        bus.write(0x0001, DEFAULT_MONITOR_ID)?;
        Ok(())
    }

    /// Prepares a cold machine to run its bootloader.
    pub fn warm_up(&mut self) {
        let sp = self.cpu.stack_reset_value(self.cpu.config.system_stack_top);
        let r = self.cpu.stack_reset_value(self.cpu.config.register_stack_top);
        let state = self.cpu.state_mut();
        state.por = WARM_START;
        state.brk = WARM_START;
        state.pc = BOOTLOADER_OFFSET;
        state.sp = sp;
        state.r = r;
        self.cpu.lookahead();
    }

    /// Copies a raw image into RAM at `offset`.
    ///
    /// # Errors
    ///
    /// [`MachineError::ImageTooLarge`] when the image runs past the end of RAM.
    pub fn load_image(&mut self, offset: u16, bytes: &[u8]) -> Result<(), MachineError> {
        if usize::from(offset) + bytes.len() > self.ram_size {
            return Err(MachineError::ImageTooLarge {
                offset,
                len: bytes.len(),
                capacity: self.ram_size,
            });
        }
        let bus = self.cpu.memory_mut();
        let mut address = offset;
        for &byte in bytes {
            bus.write(address, byte)?;
            address = address.wrapping_add(1);
        }
        self.cpu.lookahead();
        Ok(())
    }

    /// Loads at most `max_len` bytes of the file at `path` into RAM at
    /// `offset`, returning how many bytes were loaded.
    pub fn load_image_file(
        &mut self,
        path: impl AsRef<Path>,
        offset: u16,
        max_len: usize,
    ) -> Result<usize, MachineError> {
        let path = path.as_ref();
        let mut image = std::fs::read(path).map_err(|source| MachineError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        image.truncate(max_len);
        self.load_image(offset, &image)?;
        log::debug!(
            "loaded {} bytes from {} at 0x{:04X}",
            image.len(),
            path.display(),
            offset
        );
        Ok(image.len())
    }

    /// Loads a bootloader image at 0x0400, up to 0x100 bytes.
    pub fn load_bootloader(&mut self, path: impl AsRef<Path>) -> Result<usize, MachineError> {
        self.load_image_file(path, BOOTLOADER_OFFSET, BOOTLOADER_MAX_LEN)
    }

    /// Attaches a device to the bus.
    pub fn add_device(&mut self, start: u16, device: Box<dyn Device>) -> Result<(), MachineError> {
        self.cpu.memory_mut().add_device(start, device)?;
        Ok(())
    }

    /// Attaches an ACIA at `start` and returns the host side of it.
    pub fn attach_acia(&mut self, start: u16) -> Result<AciaHandle, MachineError> {
        let acia = Acia6551::new();
        let handle = acia.handle();
        self.add_device(start, Box::new(acia))?;
        Ok(handle)
    }

    // ========== Execution ==========

    /// Executes one instruction and services the bus.
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        self.cpu.cycle()?;
        self.cpu.memory_mut().update();

        if self.cpu.is_stopped() {
            self.running = false;
        }
        if self.cpu.is_waiting() || self.cpu.memory().irq_active() {
            self.cpu.assert_irq();
        }
        Ok(())
    }

    /// Steps until the machine stops.
    ///
    /// # Errors
    ///
    /// The first execution error stops the machine. The halt dump is logged
    /// and the error returned.
    pub fn run(&mut self) -> Result<(), MachineError> {
        self.running = !self.cpu.is_stopped();
        while self.running {
            if let Err(error) = self.step() {
                self.running = false;
                self.halt_and_dump(&error);
                return Err(error.into());
            }
        }
        Ok(())
    }

    /// Runs at most `steps` instructions, returning how many ran. Ends
    /// early when the CPU stops.
    pub fn run_steps(&mut self, steps: u64) -> Result<u64, MachineError> {
        self.running = !self.cpu.is_stopped();
        let mut executed = 0;
        while self.running && executed < steps {
            if let Err(error) = self.step() {
                self.running = false;
                self.halt_and_dump(&error);
                return Err(error.into());
            }
            executed += 1;
        }
        Ok(executed)
    }

    /// Marks the machine idle. A later `run` or `run_steps` resumes it.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Logs a diagnostic dump of the halted machine and returns it.
    pub fn halt_and_dump(&self, error: &ExecutionError) -> String {
        let state = self.cpu.state();
        let last = TraceEvent::from_state(state);
        let mut dump = String::new();

        let _ = writeln!(dump, "machine halted: {}", error);
        let _ = writeln!(dump, "last memory access: 0x{:04X}", state.last_memory);
        let _ = writeln!(
            dump,
            "A=0x{:04X} A_TOP=0x{:04X} R=0x{:04X} D=0x{:04X} IR=0x{:02X}",
            state.a, state.a_top, state.r, state.d, state.ir
        );
        let _ = writeln!(
            dump,
            "X=0x{:04X} S=0x{:04X} PC=0x{:04X} Y=0x{:04X} I=0x{:04X}",
            state.x, state.sp, state.pc, state.y, state.i
        );
        let _ = writeln!(dump, "flags {}", state.flag_string());
        let _ = writeln!(
            dump,
            "last instruction: {:04X}  {}",
            last.address,
            last.disassembly()
        );
        let _ = writeln!(dump, "devices:");
        for (start, end, name) in self.bus().devices() {
            let _ = writeln!(dump, "  0x{:04X}-0x{:04X} {}", start, end, name);
        }

        log::error!("{}", dump);
        dump
    }

    // ========== Accessors ==========

    pub fn cpu(&self) -> &CPU<Bus> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU<Bus> {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        self.cpu.memory()
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        self.cpu.memory_mut()
    }

    /// Bytes of RAM mapped at 0x0000.
    pub fn ram_size(&self) -> usize {
        self.ram_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> Machine {
        Machine::new(CpuConfig::default().unthrottled(), 0x4000).unwrap()
    }

    #[test]
    fn test_new_machine_is_warm() {
        let machine = machine();
        let state = machine.cpu().state();
        assert_eq!(state.pc, 0x0400);
        assert_eq!(state.por, 0x2000);
        assert_eq!(state.brk, 0x2000);
        assert_eq!(machine.bus().peek(0x0000), Some(DEFAULT_DRIVE_ID));
        assert_eq!(machine.bus().peek(0x0001), Some(DEFAULT_MONITOR_ID));
    }

    #[test]
    fn test_reset_restarts_at_por() {
        let mut machine = machine();
        machine.reset().unwrap();
        assert_eq!(machine.cpu().pc(), 0x2000);
    }

    #[test]
    fn test_reset_stops_the_machine() {
        let mut machine = machine();
        // loop: BRA loop
        machine.load_image(0x0400, &[0x80, 0xFE]).unwrap();
        machine.load_image(0x2000, &[0x80, 0xFE]).unwrap();
        assert!(!machine.is_running());

        assert_eq!(machine.run_steps(4).unwrap(), 4);
        assert!(machine.is_running());

        machine.reset().unwrap();
        assert!(!machine.is_running());
        assert_eq!(machine.cpu().pc(), 0x2000);

        assert_eq!(machine.run_steps(4).unwrap(), 4);
        assert_eq!(machine.cpu().pc(), 0x2000);
    }

    #[test]
    fn test_image_too_large() {
        let mut machine = machine();
        let result = machine.load_image(0x3FFF, &[0xEA, 0xEA]);
        assert!(matches!(
            result,
            Err(MachineError::ImageTooLarge {
                offset: 0x3FFF,
                len: 2,
                capacity: 0x4000
            })
        ));
    }

    #[test]
    fn test_missing_image_file() {
        let mut machine = machine();
        let result = machine.load_bootloader("/nonexistent/rpcboot.bin");
        assert!(matches!(result, Err(MachineError::Image { .. })));
    }

    #[test]
    fn test_run_until_stp() {
        let mut machine = machine();
        // LDX #$03 ; DEX ; BNE -3 ; STP
        machine
            .load_image(0x0400, &[0xA2, 0x03, 0xCA, 0xD0, 0xFD, 0xDB])
            .unwrap();
        machine.run().unwrap();
        assert!(!machine.is_running());
        assert_eq!(machine.cpu().x(), 0);
    }

    #[test]
    fn test_fault_halts_and_dumps() {
        let mut machine = machine();
        // STA $8000 faults: only 16K of RAM is mapped
        machine.load_image(0x0400, &[0x8D, 0x00, 0x80]).unwrap();
        let result = machine.run();
        assert!(matches!(
            result,
            Err(MachineError::Execution(ExecutionError::Bus(
                BusError::MemoryFault { address: 0x8000, .. }
            )))
        ));
        assert!(!machine.is_running());

        let error = ExecutionError::InvalidVector { vector: 0xFFFE };
        let dump = machine.halt_and_dump(&error);
        assert!(dump.contains("STA $8000"));
        assert!(dump.contains("PC=0x0403"));
        assert!(dump.contains("[*-*-*-*-*-*-*]"));
        assert!(dump.contains("0x0000-0x3FFF RAM"));
    }

    #[test]
    fn test_wai_is_released_by_the_driver() {
        let mut machine = machine();
        // CLI ; WAI
        machine.load_image(0x0400, &[0x58, 0xCB]).unwrap();
        assert_eq!(machine.run_steps(2).unwrap(), 2);
        assert!(machine.cpu().is_waiting());
        assert!(machine.cpu().state().irq_asserted);
    }

    #[test]
    fn test_acia_attached() {
        let mut machine = machine();
        let handle = machine.attach_acia(0x8000).unwrap();
        // LDA #$41 ; STA $8000 ; STP
        machine
            .load_image(0x0400, &[0xA9, 0x41, 0x8D, 0x00, 0x80, 0xDB])
            .unwrap();
        machine.run().unwrap();
        assert_eq!(handle.take_transmitted(), vec![b'A']);
    }
}
