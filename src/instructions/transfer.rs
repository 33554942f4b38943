//! # Register Transfer Instructions
//!
//! TAX, TAY, TXA, TYA, TXY, TYX, TSX, TXS and the 65el02 transfers TXR,
//! TRX, TXI and TIX.
//!
//! The destination is masked to its own width and, except for TXS, Z and N
//! are set from the transferred value.

use super::{set_accumulator, set_x, set_y};
use crate::alu;
use crate::{ExecutionError, MemoryBus, CPU};

pub(crate) fn execute_tax<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.a;
    set_x(cpu, value);
    Ok(())
}

pub(crate) fn execute_tay<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.a;
    set_y(cpu, value);
    Ok(())
}

pub(crate) fn execute_txa<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.x;
    set_accumulator(cpu, value);
    Ok(())
}

pub(crate) fn execute_tya<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.y;
    set_accumulator(cpu, value);
    Ok(())
}

pub(crate) fn execute_txy<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.x;
    set_y(cpu, value);
    Ok(())
}

pub(crate) fn execute_tyx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.y;
    set_x(cpu, value);
    Ok(())
}

pub(crate) fn execute_tsx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.sp;
    set_x(cpu, value);
    Ok(())
}

/// TXS: with 8-bit index registers only the low byte of SP is replaced.
pub(crate) fn execute_txs<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let state = &mut cpu.state;
    state.sp = if state.index_width {
        (state.sp & 0xFF00) | (state.x & 0xFF)
    } else {
        state.x
    };
    Ok(())
}

/// TXR: with 8-bit index registers only the low byte of R is replaced.
pub(crate) fn execute_txr<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let state = &mut cpu.state;
    state.r = if state.index_width {
        (state.r & 0xFF00) | (state.x & 0xFF)
    } else {
        state.x
    };
    let r = state.r;
    alu::set_arithmetic_flags(state, r, true);
    Ok(())
}

pub(crate) fn execute_trx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.r;
    set_x(cpu, value);
    Ok(())
}

pub(crate) fn execute_txi<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let x = cpu.state.x;
    cpu.state.i = x;
    alu::set_arithmetic_flags(&mut cpu.state, x, true);
    Ok(())
}

pub(crate) fn execute_tix<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.i;
    set_x(cpu, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{CpuConfig, FlatMemory, CPU};

    fn cpu_with(program: &[u8]) -> CPU<FlatMemory> {
        let mut memory = FlatMemory::new();
        memory.load(0x0400, program);
        CPU::new(memory, CpuConfig::default().unthrottled())
    }

    #[test]
    fn test_tax_masks_to_index_width() {
        let mut cpu = cpu_with(&[0xAA]);
        cpu.state_mut().emulation = false;
        cpu.state_mut().m_width = false;
        cpu.state_mut().a = 0x1280;
        cpu.step().unwrap();
        assert_eq!(cpu.x(), 0x80);
        assert!(cpu.state().negative);
    }

    #[test]
    fn test_txs_keeps_stack_page_in_8bit_mode() {
        // LDX #$40 ; TXS
        let mut cpu = cpu_with(&[0xA2, 0x40, 0x9A]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.sp(), 0x0240);
    }

    #[test]
    fn test_tsx_reads_low_byte() {
        let mut cpu = cpu_with(&[0xBA]);
        cpu.state_mut().sp = 0x01F3;
        cpu.step().unwrap();
        assert_eq!(cpu.x(), 0xF3);
    }

    #[test]
    fn test_txr_and_trx() {
        // LDX #$80 ; TXR ; LDX #$00 ; TRX
        let mut cpu = cpu_with(&[0xA2, 0x80, 0x8B, 0xA2, 0x00, 0xAB]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.r(), 0x0380);
        assert!(cpu.state().negative);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.x(), 0x80);
    }

    #[test]
    fn test_txi_and_tix() {
        // LDX #$42 ; TXI ; LDX #$00 ; TIX
        let mut cpu = cpu_with(&[0xA2, 0x42, 0x5C, 0xA2, 0x00, 0xDC]);
        for _ in 0..4 {
            cpu.step().unwrap();
        }
        assert_eq!(cpu.i(), 0x42);
        assert_eq!(cpu.x(), 0x42);
    }
}
