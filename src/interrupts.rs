//! # Interrupt Controller
//!
//! NMI, IRQ and BRK sequencing, plus processor reset.
//!
//! Interrupt lines are latched in [`CpuState`](crate::CpuState) and serviced
//! at the start of the next [`CPU::cycle`]. NMI has priority over IRQ; IRQ
//! is held off while the I flag is set; BRK is executed by the instruction
//! itself and is never masked.
//!
//! All three sequences push the return address (high byte first) and then
//! the status byte on the system stack, set I, clear D and load PC from a
//! vector. A vector reading `0xFFFF` means the firmware never installed a
//! handler, which is reported as [`ExecutionError::InvalidVector`].

use crate::{ExecutionError, MemoryBus, CPU};

/// NMI vector.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Hardware reset vector. The 65el02 starts at POR instead, so this is unused.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ and BRK vector.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Interrupt sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interrupt {
    Nmi,
    Irq,
    Brk,
}

impl Interrupt {
    /// Address of the vector pair this interrupt loads PC from.
    pub fn vector(self) -> u16 {
        match self {
            Interrupt::Nmi => NMI_VECTOR,
            Interrupt::Irq | Interrupt::Brk => IRQ_VECTOR,
        }
    }
}

impl<M: MemoryBus> CPU<M> {
    /// Runs the interrupt sequence for `kind`, returning to `return_pc`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lib65el02::{CpuConfig, FlatMemory, Interrupt, CPU};
    ///
    /// let mut memory = FlatMemory::new();
    /// memory.load(0xFFFA, &[0x00, 0x30]);
    /// let mut cpu = CPU::new(memory, CpuConfig::default().unthrottled());
    ///
    /// cpu.service_interrupt(Interrupt::Nmi, 0x0456).unwrap();
    /// assert_eq!(cpu.pc(), 0x3000);
    /// assert!(cpu.state().irq_disable);
    /// assert_eq!(cpu.pop_byte().unwrap() & 0x10, 0, "B clear for NMI");
    /// assert_eq!(cpu.pop_word().unwrap(), 0x0456);
    /// ```
    pub fn service_interrupt(
        &mut self,
        kind: Interrupt,
        return_pc: u16,
    ) -> Result<(), ExecutionError> {
        self.state.break_flag = kind == Interrupt::Brk;
        self.push_word(return_pc)?;
        self.push_byte(self.state.status())?;

        self.state.irq_disable = true;
        self.state.decimal = false;
        self.state.int_wait = false;
        match kind {
            Interrupt::Nmi => self.state.nmi_asserted = false,
            Interrupt::Irq | Interrupt::Brk => self.state.irq_asserted = false,
        }

        let vector = kind.vector();
        self.state.pc = self.read_word(vector)?;
        if self.state.pc == 0xFFFF {
            return Err(ExecutionError::InvalidVector { vector });
        }
        Ok(())
    }

    /// Latches the NMI line; serviced at the start of the next cycle.
    pub fn assert_nmi(&mut self) {
        self.state.nmi_asserted = true;
    }

    /// Latches the IRQ line; serviced once the I flag is clear.
    pub fn assert_irq(&mut self) {
        self.state.irq_asserted = true;
    }

    pub fn clear_irq(&mut self) {
        self.state.irq_asserted = false;
    }

    /// Resets the processor.
    ///
    /// Both stack pointers return to their reset values and PC to the
    /// power-on-reset address. The CPU comes up in emulation mode with
    /// 8-bit widths, every flag and interrupt line clear, and zeroed
    /// registers and counters. POR and BRK survive a reset.
    pub fn reset(&mut self) {
        let por = self.state.por;
        let brk = self.state.brk;
        self.state = crate::CpuState {
            por,
            brk,
            sp: self.stack_reset_value(self.config.system_stack_top),
            r: self.stack_reset_value(self.config.register_stack_top),
            pc: por,
            ..crate::CpuState::default()
        };
        log::debug!(
            "cpu reset: pc=0x{:04X} sp=0x{:04X} r=0x{:04X}",
            self.state.pc,
            self.state.sp,
            self.state.r
        );
        self.lookahead();
    }
}
