//! # ALU Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ORA, AND, EOR: bitwise logic into A
//! - ADC, SBC: add/subtract with carry, binary or decimal by the D flag
//! - CMP, CPX, CPY: comparisons
//! - BIT, TSB, TRB: bit tests
//! - MUL, DIV: 65el02 hardware multiply and divide through D:A
//!
//! Accumulator operations use the accumulator width; CPX and CPY use the
//! index width. The arithmetic itself lives in [`crate::alu`].

use super::set_accumulator;
use crate::alu;
use crate::{ExecutionError, MemoryBus, CPU};

/// Executes ORA: A = A | M.
pub(crate) fn execute_ora<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(false)?;
    let result = cpu.state.a | value;
    set_accumulator(cpu, result);
    Ok(())
}

/// Executes AND: A = A & M.
pub(crate) fn execute_and<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(false)?;
    let result = cpu.state.a & value;
    set_accumulator(cpu, result);
    Ok(())
}

/// Executes EOR: A = A ^ M.
pub(crate) fn execute_eor<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(false)?;
    let result = cpu.state.a ^ value;
    set_accumulator(cpu, result);
    Ok(())
}

/// Executes ADC (Add with Carry).
///
/// Decimal mode uses BCD arithmetic; classic mode reproduces the NMOS
/// behaviour of leaving N clear after a decimal add.
pub(crate) fn execute_adc<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(false)?;
    let acc = cpu.state.a;
    let classic = cpu.config.classic_mode;

    cpu.state.a = if cpu.state.decimal {
        alu::adc_decimal(&mut cpu.state, acc, value, classic)
    } else {
        alu::adc(&mut cpu.state, acc, value)
    };
    Ok(())
}

/// Executes SBC (Subtract with Carry).
pub(crate) fn execute_sbc<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(false)?;
    let acc = cpu.state.a;

    cpu.state.a = if cpu.state.decimal {
        alu::sbc_decimal(&mut cpu.state, acc, value)
    } else {
        alu::sbc(&mut cpu.state, acc, value)
    };
    Ok(())
}

pub(crate) fn execute_cmp<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(false)?;
    let reg = cpu.state.a;
    alu::cmp(&mut cpu.state, reg, value, false);
    Ok(())
}

pub(crate) fn execute_cpx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(true)?;
    let reg = cpu.state.x;
    alu::cmp(&mut cpu.state, reg, value, true);
    Ok(())
}

pub(crate) fn execute_cpy<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(true)?;
    let reg = cpu.state.y;
    alu::cmp(&mut cpu.state, reg, value, true);
    Ok(())
}

/// Executes BIT (Bit Test).
///
/// Z is set from `A & M`. The memory forms also copy the operand's sign bit
/// into N and the bit below it (bit 6 or bit 14) into V; the immediate form
/// (0x89) affects Z only.
pub(crate) fn execute_bit<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    let value = cpu.operand(false)?;
    let state = &mut cpu.state;
    state.zero = state.a & value & state.mask_m() == 0;

    if opcode != 0x89 {
        let sign = state.negative_m();
        state.negative = value & sign != 0;
        state.overflow = value & (sign >> 1) != 0;
    }
    Ok(())
}

/// Executes TSB (Test and Set Bits): Z from `A & M`, then `M = M | A`.
pub(crate) fn execute_tsb<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let ea = cpu.ea;
    let value = cpu.read_memory(ea, false)?;
    let a = cpu.state.a;
    cpu.state.zero = a & value == 0;
    cpu.write_memory(ea, (value | a) & cpu.state.mask_m(), false)
}

/// Executes TRB (Test and Reset Bits): Z from `A & M`, then `M = M & !A`.
pub(crate) fn execute_trb<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let ea = cpu.ea;
    let value = cpu.read_memory(ea, false)?;
    let a = cpu.state.a;
    cpu.state.zero = a & value == 0;
    cpu.write_memory(ea, value & !a & cpu.state.mask_m(), false)
}

/// Executes MUL: D:A = A * M, signed when C is set.
pub(crate) fn execute_mul<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.read_memory(cpu.ea, false)?;
    alu::mul(&mut cpu.state, value);
    Ok(())
}

/// Executes DIV: A = D:A / M, D = remainder, signed when C is set.
pub(crate) fn execute_div<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.read_memory(cpu.ea, false)?;
    alu::div(&mut cpu.state, value);
    Ok(())
}
