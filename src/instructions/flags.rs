//! # Status Flag Instructions
//!
//! CLC, SEC, CLI, SEI, CLD, SED, CLV, plus the width-controlling REP, SEP
//! and XCE.
//!
//! REP and SEP rewrite the status byte through `CpuState::set_status`, so
//! clearing bit 5 or bit 4 in native mode widens A or X/Y.

use crate::{ExecutionError, MemoryBus, CPU};

/// Executes one of the single-flag set/clear instructions.
pub(crate) fn execute_flag<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    let state = &mut cpu.state;
    match opcode {
        0x18 => state.carry = false,
        0x38 => state.carry = true,
        0x58 => state.irq_disable = false,
        0x78 => state.irq_disable = true,
        0xB8 => state.overflow = false,
        0xD8 => state.decimal = false,
        0xF8 => state.decimal = true,
        _ => {}
    }
    Ok(())
}

/// REP: clear the status bits set in the operand.
pub(crate) fn execute_rep<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let status = cpu.state.status() & !cpu.state.args[0];
    cpu.state.set_status(status);
    Ok(())
}

/// SEP: set the status bits set in the operand.
pub(crate) fn execute_sep<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let status = cpu.state.status() | cpu.state.args[0];
    cpu.state.set_status(status);
    Ok(())
}

/// XCE: exchange carry and emulation.
///
/// Entering emulation archives the high byte of a 16-bit accumulator, forces
/// both widths to 8 bits and truncates A, X and Y.
pub(crate) fn execute_xce<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let state = &mut cpu.state;
    let entering_emulation = state.carry;
    state.carry = state.emulation;
    state.emulation = entering_emulation;

    if entering_emulation {
        if !state.m_width {
            state.a_top = state.a & 0xFF00;
        }
        state.m_width = true;
        state.index_width = true;
        state.a &= 0xFF;
        state.x &= 0xFF;
        state.y &= 0xFF;
    }
    Ok(())
}
