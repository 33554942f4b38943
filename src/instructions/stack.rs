//! # Stack Instructions
//!
//! System stack: PHA/PLA, PHX/PLX, PHY/PLY, PHP/PLP, PHD/PLD and the
//! effective-address pushes PEA, PEI and PER.
//!
//! Register stack: RHA/RLA, RHX/RLX, RHY/RLY, RHI/RLI and the
//! effective-address pushes REA, REI and RER.
//!
//! Register pushes and pulls are width-aware; pulls set Z and N.

use super::{set_accumulator, set_x, set_y};
use crate::alu;
use crate::{ExecutionError, MemoryBus, CPU};

// ========== System Stack ==========

pub(crate) fn execute_pha<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.push(cpu.state.a, false)
}

pub(crate) fn execute_pla<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.pop(false)?;
    set_accumulator(cpu, value);
    Ok(())
}

pub(crate) fn execute_phx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.push(cpu.state.x, true)
}

pub(crate) fn execute_plx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.pop(true)?;
    set_x(cpu, value);
    Ok(())
}

pub(crate) fn execute_phy<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.push(cpu.state.y, true)
}

pub(crate) fn execute_ply<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.pop(true)?;
    set_y(cpu, value);
    Ok(())
}

pub(crate) fn execute_php<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.push_byte(cpu.state.status())
}

/// PLP restores the status byte, applying width transitions.
pub(crate) fn execute_plp<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.pop_byte()?;
    cpu.state.set_status(value);
    Ok(())
}

pub(crate) fn execute_phd<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.push(cpu.state.d, false)
}

pub(crate) fn execute_pld<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.pop(false)?;
    cpu.state.d = value;
    alu::set_arithmetic_flags(&mut cpu.state, value, false);
    Ok(())
}

/// PEA pushes its absolute operand.
pub(crate) fn execute_pea<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.push_word(cpu.state.operand_word())
}

/// PEI pushes the word stored at its zero-page operand.
pub(crate) fn execute_pei<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.read_word(u16::from(cpu.state.args[0]))?;
    cpu.push_word(value)
}

/// PER pushes PC plus the unsigned operand byte.
pub(crate) fn execute_per<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.pc.wrapping_add(u16::from(cpu.state.args[0]));
    cpu.push_word(value)
}

// ========== Register Stack ==========

pub(crate) fn execute_rha<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.r_push(cpu.state.a, false)
}

pub(crate) fn execute_rla<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.r_pop(false)?;
    set_accumulator(cpu, value);
    Ok(())
}

pub(crate) fn execute_rhx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.r_push(cpu.state.x, true)
}

pub(crate) fn execute_rlx<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.r_pop(true)?;
    set_x(cpu, value);
    Ok(())
}

pub(crate) fn execute_rhy<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.r_push(cpu.state.y, true)
}

pub(crate) fn execute_rly<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.r_pop(true)?;
    set_y(cpu, value);
    Ok(())
}

/// RHI always pushes I as a word.
pub(crate) fn execute_rhi<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.r_push_word(cpu.state.i)
}

pub(crate) fn execute_rli<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.r_pop_word()?;
    cpu.state.i = value;
    alu::set_arithmetic_flags(&mut cpu.state, value, true);
    Ok(())
}

/// RER pushes PC plus the unsigned operand byte on the register stack.
pub(crate) fn execute_rer<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.state.pc.wrapping_add(u16::from(cpu.state.args[0]));
    cpu.r_push_word(value)
}

pub(crate) fn execute_rea<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    cpu.r_push_word(cpu.state.operand_word())
}

pub(crate) fn execute_rei<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), ExecutionError> {
    let value = cpu.read_word(u16::from(cpu.state.args[0]))?;
    cpu.r_push_word(value)
}

#[cfg(test)]
mod tests {
    use crate::{CpuConfig, FlatMemory, MemoryBus, CPU};

    fn cpu_with(program: &[u8]) -> CPU<FlatMemory> {
        let mut memory = FlatMemory::new();
        memory.load(0x0400, program);
        CPU::new(memory, CpuConfig::default().unthrottled())
    }

    fn run(cpu: &mut CPU<FlatMemory>, steps: usize) {
        for _ in 0..steps {
            cpu.step().unwrap();
        }
    }

    #[test]
    fn test_pha_pla_round_trip() {
        // LDA #$42 ; PHA ; LDA #$00 ; PLA
        let mut cpu = cpu_with(&[0xA9, 0x42, 0x48, 0xA9, 0x00, 0x68]);
        run(&mut cpu, 4);
        assert_eq!(cpu.a(), 0x42);
        assert!(!cpu.state().zero);
        assert_eq!(cpu.sp(), 0x0200);
    }

    #[test]
    fn test_php_plp() {
        // SEC ; SED ; PHP ; CLC ; CLD ; PLP
        let mut cpu = cpu_with(&[0x38, 0xF8, 0x08, 0x18, 0xD8, 0x28]);
        run(&mut cpu, 6);
        assert!(cpu.state().carry);
        assert!(cpu.state().decimal);
    }

    #[test]
    fn test_pea_pei_per() {
        // PEA $1234 ; PEI ($10) ; PER +$05
        let mut cpu = cpu_with(&[0xF4, 0x34, 0x12, 0xD4, 0x10, 0x62, 0x05]);
        cpu.memory_mut().load(0x0010, &[0xCD, 0xAB]);
        run(&mut cpu, 3);
        assert_eq!(cpu.pop_word().unwrap(), 0x040C);
        assert_eq!(cpu.pop_word().unwrap(), 0xABCD);
        assert_eq!(cpu.pop_word().unwrap(), 0x1234);
    }

    #[test]
    fn test_register_stack_pushes() {
        // LDA #$11 ; RHA ; LDX #$22 ; RHX ; RHI ; REA $5678
        let mut cpu = cpu_with(&[0xA9, 0x11, 0x4B, 0xA2, 0x22, 0x1B, 0x0B, 0x44, 0x78, 0x56]);
        cpu.state_mut().i = 0xBEEF;
        run(&mut cpu, 6);
        assert_eq!(cpu.r(), 0x0300 - 6);
        assert_eq!(cpu.sp(), 0x0200, "system stack untouched");
        assert_eq!(cpu.r_pop_word().unwrap(), 0x5678);
        assert_eq!(cpu.r_pop_word().unwrap(), 0xBEEF);
        assert_eq!(cpu.r_pop_byte().unwrap(), 0x22);
        assert_eq!(cpu.r_pop_byte().unwrap(), 0x11);
    }

    #[test]
    fn test_register_stack_pulls_set_flags() {
        // RLA ; RLX
        let mut cpu = cpu_with(&[0x6B, 0x3B]);
        cpu.r_push_byte(0x00).unwrap();
        cpu.r_push_byte(0x80).unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.a(), 0x80);
        assert!(cpu.state().negative);
        cpu.step().unwrap();
        assert_eq!(cpu.x(), 0x00);
        assert!(cpu.state().zero);
    }

    #[test]
    fn test_rer_and_rei() {
        // RER +$10 ; REI ($20)
        let mut cpu = cpu_with(&[0x82, 0x10, 0x54, 0x20]);
        cpu.memory_mut().load(0x0020, &[0x00, 0x90]);
        run(&mut cpu, 2);
        assert_eq!(cpu.r_pop_word().unwrap(), 0x9000);
        assert_eq!(cpu.r_pop_word().unwrap(), 0x0412);
        assert_eq!(cpu.memory().peek(0x02FF), 0x04);
    }

    #[test]
    fn test_phd_pld() {
        // PHD ; PLD
        let mut cpu = cpu_with(&[0xDF, 0xCF]);
        cpu.state_mut().d = 0x7F;
        cpu.step().unwrap();
        cpu.state_mut().d = 0;
        cpu.step().unwrap();
        assert_eq!(cpu.d(), 0x7F);
    }
}
