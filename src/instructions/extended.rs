//! # 65el02 Extensions
//!
//! Threaded-code support, the D register, XBA and the MMU instruction.
//!
//! ## Threaded code
//!
//! The I register is an instruction pointer for Forth-style inner
//! interpreters. ENT enters a colon definition (saving I on the register
//! stack), NXT jumps to the next word in the thread and NXA fetches inline
//! data into A.
//!
//! ## MMU
//!
//! `MMU #op` reads or writes controller state selected by its operand. Set
//! forms (`0x00`-`0x06`) take their value from A; get forms (`0x80`-`0x86`)
//! load A. A get of a 16-bit value in 8-bit mode leaves the high byte in the
//! archived `a_top`. Operations that need a RedBus are ignored when the
//! memory system has none.

use super::set_accumulator;
use crate::alu;
use crate::{ExecutionError, MemoryBus, CPU};

// ========== Threaded Code ==========

/// ENT: push I on the register stack, `I = PC + 2`, `PC = word(PC)`.
pub(crate) fn execute_ent<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.r_push_word(cpu.state.i)?;
    let pc = cpu.state.pc;
    cpu.state.i = pc.wrapping_add(2);
    cpu.state.pc = cpu.read_word(pc)?;
    Ok(())
}

/// NXT: `PC = word(I)`, `I += 2`.
pub(crate) fn execute_nxt<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let i = cpu.state.i;
    cpu.state.pc = cpu.read_word(i)?;
    cpu.state.i = i.wrapping_add(2);
    Ok(())
}

/// NXA: load A from I at the accumulator width and advance I past it.
pub(crate) fn execute_nxa<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let i = cpu.state.i;
    cpu.state.a = cpu.read_memory(i, false)?;
    let step = if cpu.state.is_wide(false) { 2 } else { 1 };
    cpu.state.i = i.wrapping_add(step);
    Ok(())
}

// ========== D Register ==========

/// ZEA: zero-extend A into D:A.
pub(crate) fn execute_zea<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.state.d = 0;
    cpu.state.a_top = 0;
    Ok(())
}

/// SEA: sign-extend A into D:A.
pub(crate) fn execute_sea<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let state = &mut cpu.state;
    state.d = if state.a & state.negative_m() != 0 {
        0xFFFF
    } else {
        0
    };
    state.a_top = (state.d & 0xFF) << 8;
    Ok(())
}

pub(crate) fn execute_tda<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.d;
    set_accumulator(cpu, value);
    Ok(())
}

/// TAD: in 8-bit mode D receives the full archived accumulator.
pub(crate) fn execute_tad<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let state = &mut cpu.state;
    state.d = if state.m_width {
        state.a_top | (state.a & 0xFF)
    } else {
        state.a
    };
    let a = state.a;
    alu::set_arithmetic_flags(state, a, false);
    Ok(())
}

/// XBA: exchange the accumulator bytes.
///
/// In 8-bit mode the hidden high byte lives in `a_top`, so A and `a_top`
/// trade places.
pub(crate) fn execute_xba<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let state = &mut cpu.state;
    if state.m_width {
        let high = state.a_top >> 8;
        state.a_top = (state.a << 8) & 0xFF00;
        state.a = high;
    } else {
        state.a = state.a.swap_bytes();
    }
    Ok(())
}

// ========== MMU ==========

/// Loads a 16-bit controller value into A, archiving the high byte in
/// 8-bit mode.
fn load_wide<M: MemoryBus>(cpu: &mut CPU<M>, value: u16) {
    let state = &mut cpu.state;
    if state.m_width {
        state.a_top = value & 0xFF00;
        state.a = value & 0xFF;
    } else {
        state.a = value;
    }
}

pub(crate) fn execute_mmu<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let op = cpu.state.args[0];
    let a = cpu.state.a;

    match op {
        0x00 => {
            if let Some(redbus) = cpu.memory.redbus_mut() {
                redbus.set_active_device_id(a as u8);
            }
        }
        0x80 => {
            let id = cpu.memory.redbus().map_or(0, |r| r.active_device_id());
            cpu.state.a = u16::from(id);
        }
        0x01 => {
            if let Some(redbus) = cpu.memory.redbus_mut() {
                redbus.set_window_offset(a);
            }
        }
        0x81 => {
            let offset = cpu
                .memory
                .redbus()
                .and_then(|r| r.window_offset())
                .unwrap_or(0);
            load_wide(cpu, offset);
        }
        0x02 => {
            if let Some(redbus) = cpu.memory.redbus_mut() {
                redbus.enable();
            }
        }
        0x82 => {
            if let Some(redbus) = cpu.memory.redbus_mut() {
                redbus.disable();
            }
        }
        0x03 => {
            if let Some(redbus) = cpu.memory.redbus_mut() {
                redbus.set_memory_window(a);
            }
        }
        0x83 => {
            let window = cpu.memory.redbus().map_or(0, |r| r.memory_window());
            load_wide(cpu, window);
        }
        0x04 | 0x84 => {
            if let Some(redbus) = cpu.memory.redbus_mut() {
                redbus.set_window_enabled(op == 0x04);
            }
        }
        0x05 => cpu.state.brk = a,
        0x85 => {
            let brk = cpu.state.brk;
            load_wide(cpu, brk);
        }
        0x06 => cpu.state.por = a,
        0x86 => {
            let por = cpu.state.por;
            load_wide(cpu, por);
        }
        0xFF => log::info!("MMU output: A=0x{:04X}", a),
        _ => log::debug!("ignoring unknown MMU operation 0x{:02X}", op),
    }
    Ok(())
}
