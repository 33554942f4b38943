//! # Branch Instructions
//!
//! BPL, BMI, BVC, BVS, BCC, BCS, BNE, BEQ and the unconditional BRA.
//!
//! The signed 8-bit offset is relative to the address of the next
//! instruction and the target wraps modulo 0x10000. No flags are affected.

use crate::{ExecutionError, MemoryBus, CPU};

/// Executes a branch, taking it when the opcode's condition holds.
pub(crate) fn execute_branch<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), ExecutionError> {
    let state = &cpu.state;
    let taken = match opcode {
        0x10 => !state.negative,
        0x30 => state.negative,
        0x50 => !state.overflow,
        0x70 => state.overflow,
        0x80 => true,
        0x90 => !state.carry,
        0xB0 => state.carry,
        0xD0 => !state.zero,
        0xF0 => state.zero,
        _ => false,
    };

    if taken {
        let offset = cpu.state.args[0] as i8;
        cpu.state.pc = cpu.state.pc.wrapping_add_signed(i16::from(offset));
    }
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
    fn test_bra_forward() {
        let mut cpu = cpu_with(&[0x80, 0x10]);
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x0412);
    }

    #[test]
    fn test_beq_backward_when_zero() {
        let mut cpu = cpu_with(&[0xF0, 0xFC]);
        cpu.state_mut().zero = true;
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x03FE);
    }

    #[test]
    fn test_branch_not_taken() {
        let mut cpu = cpu_with(&[0xB0, 0x40]);
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x0402);
    }

    #[test]
    fn test_branch_wraps_address_space() {
        let mut cpu = cpu_with(&[]);
        cpu.memory_mut().load(0xFFF0, &[0x80, 0x7F]);
        cpu.state_mut().pc = 0xFFF0;
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x0071);
    }
}
