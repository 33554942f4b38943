//! # Load and Store Instructions
//!
//! LDA/STA move A at the accumulator width; LDX/LDY/STX/STY move the index
//! registers at the index width. STZ stores zero at the accumulator width.

use super::{set_accumulator, set_x, set_y};
use crate::{ExecutionError, MemoryBus, CPU};

pub(crate) fn execute_lda<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(false)?;
    set_accumulator(cpu, value);
    Ok(())
}

pub(crate) fn execute_ldx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(true)?;
    set_x(cpu, value);
    Ok(())
}

pub(crate) fn execute_ldy<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.operand(true)?;
    set_y(cpu, value);
    Ok(())
}

pub(crate) fn execute_sta<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.write_memory(cpu.ea, cpu.state.a, false)
}

pub(crate) fn execute_stx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.write_memory(cpu.ea, cpu.state.x, true)
}

pub(crate) fn execute_sty<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.write_memory(cpu.ea, cpu.state.y, true)
}

pub(crate) fn execute_stz<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.write_memory(cpu.ea, 0, false)
}

#[cfg(test)]
mod tests {
    use crate::{CpuConfig, FlatMemory, MemoryBus, CPU};

    fn cpu_with(program: &[u8]) -> CPU<FlatMemory> {
        let mut memory = FlatMemory::new();
        memory.load(0x0400, program);
        CPU::new(memory, CpuConfig::default().unthrottled())
    }

    #[test]
    fn test_lda_sets_flags() {
        let mut cpu = cpu_with(&[0xA9, 0x00, 0xA9, 0x80]);
        cpu.step().unwrap();
        assert!(cpu.state().zero);
        cpu.step().unwrap();
        assert!(cpu.state().negative);
        assert!(!cpu.state().zero);
    }

    #[test]
    fn test_lda_16bit_immediate() {
        let mut cpu = cpu_with(&[0xA9, 0x34, 0x12, 0xEA]);
        cpu.state_mut().emulation = false;
        cpu.state_mut().m_width = false;
        cpu.step().unwrap();
        assert_eq!(cpu.a(), 0x1234);
        assert_eq!(cpu.pc(), 0x0403);
    }

    #[test]
    fn test_ldx_zero_page_y() {
        // LDY #$02 ; LDX $10,Y
        let mut cpu = cpu_with(&[0xA0, 0x02, 0xB6, 0x10]);
        cpu.memory_mut().load(0x0012, &[0x77]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.x(), 0x77);
    }

    #[test]
    fn test_sta_16bit_writes_word() {
        let mut cpu = cpu_with(&[0x8D, 0x00, 0x30]);
        cpu.state_mut().emulation = false;
        cpu.state_mut().m_width = false;
        cpu.state_mut().a = 0xBEEF;
        cpu.step().unwrap();
        assert_eq!(cpu.memory().peek(0x3000), 0xEF);
        assert_eq!(cpu.memory().peek(0x3001), 0xBE);
    }

    #[test]
    fn test_stz_absolute() {
        let mut cpu = cpu_with(&[0x9C, 0x00, 0x30]);
        cpu.memory_mut().load(0x3000, &[0xAA, 0xBB]);
        cpu.step().unwrap();
        assert_eq!(cpu.memory().peek(0x3000), 0x00);
        assert_eq!(cpu.memory().peek(0x3001), 0xBB);
    }

    #[test]
    fn test_sta_stack_relative() {
        // LDA #$5A ; STA $01,S
        let mut cpu = cpu_with(&[0xA9, 0x5A, 0x83, 0x01]);
        cpu.state_mut().sp = 0x01F0;
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.memory().peek(0x01F1), 0x5A);
    }
}
