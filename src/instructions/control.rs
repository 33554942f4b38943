//! # Control Flow Instructions
//!
//! This module implements jumps, subroutine calls and returns, BRK, and the
//! processor-halting STP and WAI.
//!
//! - JMP abs / JMP (abs) / JMP (abs,X)
//! - JSR abs / JSR (abs,X): push the address of the last operand byte
//! - RTS: pull and add one
//! - RTI: pull status, then PC
//! - BRK: software interrupt through the IRQ vector
//! - STP: stop until reset; WAI: idle until an interrupt line is asserted

use crate::interrupts::Interrupt;
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes JMP in its three forms.
///
/// In classic mode the indirect form reproduces the NMOS page-wrap bug: a
/// pointer at `$xxFF` takes its high byte from `$xx00`.
pub(crate) fn execute_jmp<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    let target = cpu.state.operand_word();
    cpu.state.pc = match opcode {
        0x6C => {
            let lo = cpu.read_byte(target)?;
            let hi_addr = if cpu.config.classic_mode && target & 0xFF == 0xFF {
                target & 0xFF00
            } else {
                target.wrapping_add(1)
            };
            let hi = cpu.read_byte(hi_addr)?;
            u16::from_le_bytes([lo, hi])
        }
        0x7C => cpu.read_word(target.wrapping_add(cpu.state.x))?,
        _ => target,
    };
    Ok(())
}

/// Executes JSR abs (0x20) and JSR (abs,X) (0xFC).
pub(crate) fn execute_jsr<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    let target = cpu.state.operand_word();
    let target = if opcode == 0xFC {
        cpu.read_word(target.wrapping_add(cpu.state.x))?
    } else {
        target
    };
    cpu.push_word(cpu.state.pc.wrapping_sub(1))?;
    cpu.state.pc = target;
    Ok(())
}

pub(crate) fn execute_rts<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.state.pc = cpu.pop_word()?.wrapping_add(1);
    Ok(())
}

pub(crate) fn execute_rti<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let status = cpu.pop_byte()?;
    cpu.state.set_status(status);
    cpu.state.pc = cpu.pop_word()?;
    Ok(())
}

/// BRK skips its signature byte: the return address is PC + 1.
pub(crate) fn execute_brk<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let return_pc = cpu.state.pc.wrapping_add(1);
    cpu.service_interrupt(Interrupt::Brk, return_pc)
}

pub(crate) fn execute_stp<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.state.signal_stop = true;
    Ok(())
}

pub(crate) fn execute_wai<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.state.int_wait = true;
    Ok(())
}
