//! # Shift and Rotate Instructions
//!
//! ASL, LSR, ROL and ROR on the accumulator (opcodes `x A`) or on memory.
//! Memory forms are read-modify-write at the accumulator width.

use crate::alu;
use crate::state::CpuState;
use crate::{ExecutionError, MemoryBus, CPU};

type ShiftOp = fn(&mut CpuState, u16) -> u16;

fn shift<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8, op: ShiftOp) -> Result<(), ExecutionError> {
    if opcode & 0x0F == 0x0A {
        let a = cpu.state.a;
        cpu.state.a = op(&mut cpu.state, a);
        return Ok(());
    }

    let ea = cpu.ea;
    let value = cpu.read_memory(ea, false)?;
    let result = op(&mut cpu.state, value);
    cpu.write_memory(ea, result, false)
}

pub(crate) fn execute_asl<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    shift(cpu, opcode, alu::asl)
}

pub(crate) fn execute_lsr<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    shift(cpu, opcode, alu::lsr)
}

pub(crate) fn execute_rol<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    shift(cpu, opcode, alu::rol)
}

pub(crate) fn execute_ror<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    shift(cpu, opcode, alu::ror)
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
    fn test_asl_accumulator() {
        // LDA #$81 ; ASL A
        let mut cpu = cpu_with(&[0xA9, 0x81, 0x0A]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.a(), 0x02);
        assert!(cpu.state().carry);
    }

    #[test]
    fn test_ror_memory_through_carry() {
        // SEC ; ROR $20
        let mut cpu = cpu_with(&[0x38, 0x66, 0x20]);
        cpu.memory_mut().load(0x0020, &[0x02]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.memory().peek(0x0020), 0x81);
        assert!(!cpu.state().carry);
        assert!(cpu.state().negative);
    }

    #[test]
    fn test_lsr_absolute_x() {
        // LDX #$01 ; LSR $3000,X
        let mut cpu = cpu_with(&[0xA2, 0x01, 0x5E, 0x00, 0x30]);
        cpu.memory_mut().load(0x3001, &[0x03]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.memory().peek(0x3001), 0x01);
        assert!(cpu.state().carry);
    }

    #[test]
    fn test_rol_16bit_memory() {
        let mut cpu = cpu_with(&[0x2E, 0x00, 0x30]);
        cpu.state_mut().emulation = false;
        cpu.state_mut().m_width = false;
        cpu.memory_mut().load(0x3000, &[0x00, 0x80]);
        cpu.step().unwrap();
        assert_eq!(cpu.memory().peek(0x3000), 0x00);
        assert_eq!(cpu.memory().peek(0x3001), 0x00);
        assert!(cpu.state().carry);
        assert!(cpu.state().zero);
    }
}
