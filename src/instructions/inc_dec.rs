//! # Increment and Decrement Instructions
//!
//! INC and DEC operate on A (0x1A, 0x3A) or on memory at the accumulator
//! width. INX, INY, DEX and DEY wrap within the index width.

use super::{set_accumulator, set_x, set_y};
use crate::alu;
use crate::{ExecutionError, MemoryBus, CPU};

fn modify<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
    delta: fn(u16) -> u16,
) -> Result<(), ExecutionError> {
    if opcode == 0x1A || opcode == 0x3A {
        let result = delta(cpu.state.a);
        set_accumulator(cpu, result);
        return Ok(());
    }

    let ea = cpu.ea;
    let value = cpu.read_memory(ea, false)?;
    let result = delta(value) & cpu.state.mask_m();
    cpu.write_memory(ea, result, false)?;
    alu::set_arithmetic_flags(&mut cpu.state, result, false);
    Ok(())
}

pub(crate) fn execute_inc<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    modify(cpu, opcode, |v| v.wrapping_add(1))
}

pub(crate) fn execute_dec<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    modify(cpu, opcode, |v| v.wrapping_sub(1))
}

pub(crate) fn execute_inx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.x.wrapping_add(1);
    set_x(cpu, value);
    Ok(())
}

pub(crate) fn execute_iny<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.y.wrapping_add(1);
    set_y(cpu, value);
    Ok(())
}

pub(crate) fn execute_dex<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.x.wrapping_sub(1);
    set_x(cpu, value);
    Ok(())
}

pub(crate) fn execute_dey<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.y.wrapping_sub(1);
    set_y(cpu, value);
    Ok(())
}
