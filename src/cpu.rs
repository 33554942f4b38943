//! # CPU State and Execution
//!
//! This module contains the CPU struct and the fetch-decode-execute loop.
//!
//! ## Execution Model
//!
//! [`CPU::cycle`] (alias [`CPU::step`]) runs exactly one instruction:
//!
//! 1. Return at once while stopped (STP)
//! 2. Service a pending NMI, or an IRQ when I is clear; idle while waiting (WAI)
//! 3. Fetch the opcode and its operand bytes, sized for the current widths
//! 4. Resolve the effective address from the opcode's bit pattern
//! 5. Execute
//! 6. Throttle to the configured clock speed
//! 7. Peek the next instruction (lookahead) and emit a trace event
//!
//! Every CPU-internal bus read is privileged.

use std::time::Instant;

use crate::config::CpuConfig;
use crate::interrupts::Interrupt;
use crate::state::CpuState;
use crate::trace::{TraceEvent, TraceSink};
use crate::{AddressingMode, ExecutionError, MemoryBus, OPCODE_TABLE};

/// 65el02 CPU and execution context.
///
/// Generic over the memory system via the [`MemoryBus`] trait.
///
/// # Examples
///
/// ```
/// use lib65el02::{CpuConfig, FlatMemory, CPU};
///
/// let cpu = CPU::new(FlatMemory::new(), CpuConfig::default());
///
/// // Power-on state: emulation mode at the default POR address
/// assert_eq!(cpu.pc(), 0x0400);
/// assert_eq!(cpu.sp(), 0x0200);
/// assert_eq!(cpu.r(), 0x0300);
/// assert!(cpu.state().emulation);
/// assert_eq!(cpu.cycles(), 0);
/// ```
pub struct CPU<M: MemoryBus> {
    pub(crate) state: CpuState,

    pub(crate) memory: M,

    pub(crate) config: CpuConfig,

    /// Effective address of the current instruction
    pub(crate) ea: u16,

    trace: Option<Box<dyn TraceSink>>,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a CPU over `memory` and resets it.
    pub fn new(memory: M, config: CpuConfig) -> Self {
        let mut cpu = Self {
            state: CpuState::new(),
            memory,
            config,
            ea: 0,
            trace: None,
        };
        cpu.reset();
        cpu
    }

    // ========== Execution ==========

    /// Executes one instruction.
    ///
    /// # Errors
    ///
    /// Bus faults raised by any access, and [`ExecutionError::InvalidVector`]
    /// when an interrupt finds no handler installed. The illegal opcode
    /// `0xFF` is not an error: it sets `op_trap` and otherwise does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use lib65el02::{CpuConfig, FlatMemory, CPU};
    ///
    /// let mut memory = FlatMemory::new();
    /// memory.load(0x0400, &[0xA2, 0x05, 0xCA, 0xD0, 0xFD, 0xDB]); // LDX #5 / loop: DEX / BNE loop / STP
    /// let mut cpu = CPU::new(memory, CpuConfig::default().unthrottled());
    ///
    /// while !cpu.is_stopped() {
    ///     cpu.cycle().unwrap();
    /// }
    /// assert_eq!(cpu.x(), 0);
    /// assert_eq!(cpu.step_count(), 12);
    /// ```
    pub fn cycle(&mut self) -> Result<(), ExecutionError> {
        if self.state.signal_stop {
            return Ok(());
        }

        if self.state.nmi_asserted {
            self.service_interrupt(Interrupt::Nmi, self.state.pc)?;
        } else if self.state.irq_asserted {
            // Waking from WAI takes this cycle; the latched IRQ is taken on the next
            let was_waiting = self.state.int_wait;
            self.state.int_wait = false;
            if !was_waiting && !self.state.irq_disable {
                self.service_interrupt(Interrupt::Irq, self.state.pc)?;
            }
        } else if self.state.int_wait {
            return Ok(());
        }

        // Instant is unavailable on some targets; only consult it when throttling
        let started = self.config.clock_speed.is_throttled().then(Instant::now);

        self.fetch()?;
        let opcode = self.state.ir;
        crate::instructions::execute(self, opcode)?;

        self.throttle(opcode, started);
        self.lookahead();

        if let Some(sink) = self.trace.as_mut() {
            sink.instruction(&TraceEvent::from_state(&self.state));
        }
        Ok(())
    }

    /// Alias for [`cycle`](Self::cycle).
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        self.cycle()
    }

    /// Runs instructions until at least `cycle_budget` nominal clock cycles
    /// have elapsed or the CPU stops or waits.
    ///
    /// Returns the number of cycles actually consumed.
    pub fn run_for_cycles(&mut self, cycle_budget: u64) -> Result<u64, ExecutionError> {
        let start = self.state.cycles;
        while self.state.cycles - start < cycle_budget {
            if self.state.signal_stop || (self.state.int_wait && !self.interrupt_pending()) {
                break;
            }
            self.cycle()?;
        }
        Ok(self.state.cycles - start)
    }

    fn interrupt_pending(&self) -> bool {
        self.state.nmi_asserted || self.state.irq_asserted
    }

    fn fetch(&mut self) -> Result<(), ExecutionError> {
        let pc = self.state.pc;
        self.state.last_pc = pc;
        let opcode = self.read_byte(pc)?;
        self.state.pc = pc.wrapping_add(1);
        self.state.ir = opcode;
        self.state.op_trap = false;

        let size = self.state.instruction_size(opcode);
        self.state.inst_size = size;
        self.state.args = [0; 2];
        for slot in 0..usize::from(size - 1) {
            self.state.args[slot] = self.read_byte(self.state.pc)?;
            self.state.pc = self.state.pc.wrapping_add(1);
        }

        self.state.step_counter += 1;
        Ok(())
    }

    /// Spins until the opcode's nominal clock count has elapsed.
    fn throttle(&mut self, opcode: u8, started: Option<Instant>) {
        let count = OPCODE_TABLE[opcode as usize].cycles(self.config.classic_mode);
        if count == 0 {
            log::warn!("opcode 0x{:02X} has no clock count", opcode);
            return;
        }
        self.state.cycles += u64::from(count);

        if let Some(started) = started {
            let budget = self.config.clock_speed.cycle_duration() * u32::from(count);
            while started.elapsed() < budget {
                std::hint::spin_loop();
            }
        }
    }

    /// Pre-reads the instruction at PC without side effects.
    pub(crate) fn lookahead(&mut self) {
        let pc = self.state.pc;
        let opcode = self.memory.peek(pc);
        let size = self.state.instruction_size(opcode);
        let mut args = [0; 2];
        for (slot, arg) in args.iter_mut().enumerate().take(usize::from(size - 1)) {
            *arg = self.memory.peek(pc.wrapping_add(slot as u16 + 1));
        }
        self.state.next_ir = opcode;
        self.state.next_args = args;
    }

    // ========== Memory Access ==========

    pub(crate) fn read_byte(&mut self, addr: u16) -> Result<u8, ExecutionError> {
        self.state.last_memory = addr;
        Ok(self.memory.read(addr, true)?)
    }

    pub(crate) fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), ExecutionError> {
        self.state.last_memory = addr;
        Ok(self.memory.write(addr, value)?)
    }

    /// Little-endian word at `addr`, wrapping at the top of memory.
    pub(crate) fn read_word(&mut self, addr: u16) -> Result<u16, ExecutionError> {
        let lo = self.read_byte(addr)?;
        let hi = self.read_byte(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Word whose high byte is fetched from the next zero-page location.
    fn read_zero_page_pointer(&mut self, ptr: u16) -> Result<u16, ExecutionError> {
        let lo = self.read_byte(ptr & 0xFF)?;
        let hi = self.read_byte(ptr.wrapping_add(1) & 0xFF)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Reads a byte or a word depending on the width selected by `index`.
    pub(crate) fn read_memory(&mut self, addr: u16, index: bool) -> Result<u16, ExecutionError> {
        if self.state.is_wide(index) {
            self.read_word(addr)
        } else {
            self.read_byte(addr).map(u16::from)
        }
    }

    /// Writes a byte or a word depending on the width selected by `index`.
    pub(crate) fn write_memory(
        &mut self,
        addr: u16,
        value: u16,
        index: bool,
    ) -> Result<(), ExecutionError> {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte(addr, lo)?;
        if self.state.is_wide(index) {
            self.write_byte(addr.wrapping_add(1), hi)?;
        }
        Ok(())
    }

    /// Source operand of the current instruction: the immediate bytes, or
    /// memory at the effective address.
    pub(crate) fn operand(&mut self, index: bool) -> Result<u16, ExecutionError> {
        if OPCODE_TABLE[self.state.ir as usize].addressing_mode == AddressingMode::Immediate {
            Ok(if self.state.is_wide(index) {
                self.state.operand_word()
            } else {
                u16::from(self.state.args[0])
            })
        } else {
            self.read_memory(self.ea, index)
        }
    }

    // ========== Addressing ==========

    /// Resolves the effective address of the current instruction.
    ///
    /// Decoding follows the opcode bits: `ir & 3` selects the column group
    /// and `(ir >> 2) & 7` the addressing mode within it. Combinations with
    /// no memory operand resolve to 0.
    pub(crate) fn resolve_effective_address(&mut self) -> Result<u16, ExecutionError> {
        let ir = self.state.ir;
        let arg0 = u16::from(self.state.args[0]);
        let word = self.state.operand_word();
        let x = self.state.x;
        let y = self.state.y;
        let mask_x = self.state.mask_x();

        let ea = match (ir & 3, (ir >> 2) & 7) {
            (0 | 2, 1) => arg0,
            (0 | 2, 3) => word,
            (2, 4) => self.read_zero_page_pointer(arg0)?,
            (0 | 2, 5) => match ir {
                0x14 => arg0,
                0x96 | 0xB6 => arg0.wrapping_add(y) & mask_x,
                _ => arg0.wrapping_add(x) & mask_x,
            },
            (0 | 2, 7) => match ir {
                0x1C | 0x9C => word,
                0xBE => word.wrapping_add(y),
                _ => word.wrapping_add(x),
            },

            (1, 0) => self.read_zero_page_pointer(arg0.wrapping_add(x) & 0xFF)?,
            (1, 1) => arg0,
            (1, 3) => word,
            (1, 4) => self.read_zero_page_pointer(arg0)?.wrapping_add(y),
            (1, 5) => arg0.wrapping_add(x) & mask_x,
            (1, 6) => word.wrapping_add(y),
            (1, 7) => word.wrapping_add(x),

            (3, 0) => arg0.wrapping_add(self.state.sp),
            (3, 1) => arg0.wrapping_add(self.state.r),
            (3, 3) if ir & 0x20 != 0 => word,
            (3, 3) => arg0,
            (3, 4) => {
                let ptr = arg0.wrapping_add(self.state.sp);
                self.read_word(ptr)?.wrapping_add(y)
            }
            (3, 5) => {
                let ptr = arg0.wrapping_add(self.state.r);
                self.read_word(ptr)?.wrapping_add(y)
            }
            (3, 7) if ir & 0x20 != 0 => word.wrapping_add(x),
            (3, 7) => arg0.wrapping_add(x) & mask_x,

            _ => 0,
        };
        Ok(ea)
    }

    // ========== Tracing ==========

    /// Installs a per-instruction trace sink, replacing any previous one.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Removes and returns the installed trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace.take()
    }

    // ========== Accessors ==========

    pub fn a(&self) -> u16 {
        self.state.a
    }

    pub fn x(&self) -> u16 {
        self.state.x
    }

    pub fn y(&self) -> u16 {
        self.state.y
    }

    pub fn sp(&self) -> u16 {
        self.state.sp
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    /// Register stack pointer.
    pub fn r(&self) -> u16 {
        self.state.r
    }

    /// Threaded-code instruction pointer.
    pub fn i(&self) -> u16 {
        self.state.i
    }

    pub fn d(&self) -> u16 {
        self.state.d
    }

    /// Packed processor status byte.
    pub fn status(&self) -> u8 {
        self.state.status()
    }

    /// Total nominal clock cycles since reset.
    pub fn cycles(&self) -> u64 {
        self.state.cycles
    }

    /// Instructions executed since reset.
    pub fn step_count(&self) -> u64 {
        self.state.step_counter
    }

    /// True once STP has executed.
    pub fn is_stopped(&self) -> bool {
        self.state.signal_stop
    }

    /// True while WAI is waiting for an interrupt.
    pub fn is_waiting(&self) -> bool {
        self.state.int_wait
    }

    /// Opcode and operand bytes at PC, as peeked after the last cycle.
    pub fn next_instruction(&self) -> (u8, [u8; 2]) {
        (self.state.next_ir, self.state.next_args)
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlatMemory;

    fn cpu_with(program: &[u8]) -> CPU<FlatMemory> {
        let mut memory = FlatMemory::new();
        memory.load(0x0400, program);
        CPU::new(memory, CpuConfig::default().unthrottled())
    }

    #[test]
    fn test_fetch_reads_operands() {
        let mut cpu = cpu_with(&[0xAD, 0x34, 0x12]);
        cpu.fetch().unwrap();
        assert_eq!(cpu.state.ir, 0xAD);
        assert_eq!(cpu.state.args, [0x34, 0x12]);
        assert_eq!(cpu.state.inst_size, 3);
        assert_eq!(cpu.pc(), 0x0403);
        assert_eq!(cpu.state.last_pc, 0x0400);
    }

    #[test]
    fn test_fetch_wraps_pc() {
        let mut cpu = cpu_with(&[]);
        cpu.memory.load(0xFFFF, &[0xEA]);
        cpu.state.pc = 0xFFFF;
        cpu.fetch().unwrap();
        assert_eq!(cpu.pc(), 0x0000);
    }

    fn resolve(cpu: &mut CPU<FlatMemory>, ir: u8, args: [u8; 2]) -> u16 {
        cpu.state.ir = ir;
        cpu.state.args = args;
        cpu.resolve_effective_address().unwrap()
    }

    #[test]
    fn test_zero_page_indexed_wraps_in_8bit_mode() {
        let mut cpu = cpu_with(&[]);
        cpu.state.x = 0x20;
        assert_eq!(resolve(&mut cpu, 0xB5, [0xF0, 0]), 0x0010);
        cpu.state.y = 0x05;
        assert_eq!(resolve(&mut cpu, 0xB6, [0x10, 0]), 0x0015);
        assert_eq!(resolve(&mut cpu, 0x14, [0x10, 0]), 0x0010);
    }

    #[test]
    fn test_indirect_modes() {
        let mut cpu = cpu_with(&[]);
        cpu.memory.load(0x0010, &[0x00, 0x30]);
        cpu.memory.load(0x00FF, &[0x00]);
        cpu.memory.load(0x0000, &[0x40]);
        cpu.state.x = 0x04;
        cpu.state.y = 0x02;

        assert_eq!(resolve(&mut cpu, 0xA1, [0x0C, 0]), 0x3000);
        assert_eq!(resolve(&mut cpu, 0xB1, [0x10, 0]), 0x3002);
        assert_eq!(resolve(&mut cpu, 0xB2, [0x10, 0]), 0x3000);
        assert_eq!(resolve(&mut cpu, 0xB2, [0xFF, 0]), 0x4000, "pointer wraps in page zero");
    }

    #[test]
    fn test_absolute_exceptions() {
        let mut cpu = cpu_with(&[]);
        cpu.state.x = 0x10;
        cpu.state.y = 0x20;
        assert_eq!(resolve(&mut cpu, 0x9C, [0x00, 0x20]), 0x2000);
        assert_eq!(resolve(&mut cpu, 0x9E, [0x00, 0x20]), 0x2010);
        assert_eq!(resolve(&mut cpu, 0xBE, [0x00, 0x20]), 0x2020);
        assert_eq!(resolve(&mut cpu, 0xBD, [0xFF, 0xFF]), 0x000F);
    }

    #[test]
    fn test_stack_and_register_relative() {
        let mut cpu = cpu_with(&[]);
        cpu.state.sp = 0x01F0;
        cpu.state.r = 0x02E0;
        cpu.state.y = 0x01;
        cpu.memory.load(0x01F2, &[0x00, 0x50]);
        cpu.memory.load(0x02E4, &[0x00, 0x60]);

        assert_eq!(resolve(&mut cpu, 0xA3, [0x02, 0]), 0x01F2);
        assert_eq!(resolve(&mut cpu, 0xA7, [0x04, 0]), 0x02E4);
        assert_eq!(resolve(&mut cpu, 0xB3, [0x02, 0]), 0x5001);
        assert_eq!(resolve(&mut cpu, 0xB7, [0x04, 0]), 0x6001);
    }

    #[test]
    fn test_multiply_operand_addressing() {
        let mut cpu = cpu_with(&[]);
        cpu.state.x = 0x02;
        assert_eq!(resolve(&mut cpu, 0x0F, [0x40, 0x12]), 0x0040);
        assert_eq!(resolve(&mut cpu, 0x2F, [0x40, 0x12]), 0x1240);
        assert_eq!(resolve(&mut cpu, 0x1F, [0x40, 0x12]), 0x0042);
        assert_eq!(resolve(&mut cpu, 0x3F, [0x40, 0x12]), 0x1242);
    }

    #[test]
    fn test_lookahead_peeks_next_instruction() {
        let mut cpu = cpu_with(&[0xEA, 0xA9, 0x42]);
        assert_eq!(cpu.next_instruction(), (0xEA, [0, 0]));
        cpu.step().unwrap();
        assert_eq!(cpu.next_instruction(), (0xA9, [0x42, 0]));
    }

    #[test]
    fn test_wait_idles_until_interrupt() {
        let mut cpu = cpu_with(&[0xCB, 0xEA]);
        cpu.step().unwrap();
        assert!(cpu.is_waiting());
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x0401, "no fetch while waiting");

        // Masked IRQ still releases WAI
        cpu.state.irq_disable = true;
        cpu.assert_irq();
        cpu.step().unwrap();
        assert!(!cpu.is_waiting());
        assert_eq!(cpu.pc(), 0x0402);
    }

    #[test]
    fn test_wake_defers_irq_service_one_instruction() {
        // WAI ; NOP ; NOP, IRQ handler at 0x3000
        let mut cpu = cpu_with(&[0xCB, 0xEA, 0xEA]);
        cpu.memory_mut().load(0xFFFE, &[0x00, 0x30]);
        cpu.memory_mut().load(0x3000, &[0xEA]);
        cpu.step().unwrap();

        cpu.assert_irq();
        cpu.step().unwrap();
        assert!(!cpu.is_waiting());
        assert_eq!(cpu.pc(), 0x0402);
        assert!(cpu.state.irq_asserted);

        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x3001);
        assert!(cpu.state.irq_disable);
    }

    #[test]
    fn test_stop_halts_execution() {
        let mut cpu = cpu_with(&[0xDB, 0xEA]);
        cpu.step().unwrap();
        assert!(cpu.is_stopped());
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x0401);
    }

    #[test]
    fn test_run_for_cycles() {
        let mut cpu = cpu_with(&[0xEA; 16]);
        let used = cpu.run_for_cycles(10).unwrap();
        assert_eq!(used, 10);
        assert_eq!(cpu.step_count(), 5);
    }
}
