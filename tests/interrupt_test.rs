//! Integration tests for interrupt sequencing.
//!
//! These tests verify:
//! - IRQ masking by the I flag, with the request held until unmasked
//! - NMI priority over IRQ
//! - WAI release by either line
//! - BRK return addresses and the pushed break flag
//! - Fatal uninitialised vectors

use lib65el02::interrupts::{IRQ_VECTOR, NMI_VECTOR};
use lib65el02::{CpuConfig, ExecutionError, FlatMemory, MemoryBus, CPU};

/// CPU with the IRQ handler at 0x3000 and the NMI handler at 0x3100.
/// Both handlers are `INX ; RTI`.
fn setup_cpu(program: &[u8]) -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.load(0x0400, program);
    memory.load(IRQ_VECTOR, &[0x00, 0x30]);
    memory.load(NMI_VECTOR, &[0x00, 0x31]);
    memory.load(0x3000, &[0xE8, 0x40]);
    memory.load(0x3100, &[0xE8, 0x40]);
    CPU::new(memory, CpuConfig::default().unthrottled())
}

#[test]
fn test_irq_held_while_masked() {
    // SEI ; NOP ; CLI ; NOP
    let mut cpu = setup_cpu(&[0x78, 0xEA, 0x58, 0xEA]);
    cpu.step().unwrap();
    cpu.assert_irq();

    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x0403);
    assert!(cpu.state().irq_asserted, "request stays latched while masked");

    // Serviced before the next fetch, then the handler's INX runs
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x3001);
    assert_eq!(cpu.x(), 1);
    assert!(cpu.state().irq_disable);
    assert!(!cpu.state().irq_asserted);

    // RTI returns to the interrupted instruction with I clear again
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x0403);
    assert!(!cpu.state().irq_disable);
}

#[test]
fn test_irq_pushes_status_without_break() {
    let mut cpu = setup_cpu(&[0xEA]);
    cpu.state_mut().carry = true;
    cpu.assert_irq();
    cpu.step().unwrap();

    // Stack: status at 0x01FD, return address at 0x01FE/0x01FF
    let status = cpu.memory().peek(0x01FD);
    assert_eq!(status & 0x10, 0);
    assert_eq!(status & 0x01, 0x01);
    assert_eq!(cpu.memory().peek(0x01FE), 0x00);
    assert_eq!(cpu.memory().peek(0x01FF), 0x04);
}

#[test]
fn test_nmi_has_priority_and_ignores_mask() {
    // SEI ; NOP
    let mut cpu = setup_cpu(&[0x78, 0xEA]);
    cpu.step().unwrap();
    cpu.assert_irq();
    cpu.assert_nmi();

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x3101);
    assert!(!cpu.state().nmi_asserted);
    assert!(cpu.state().irq_asserted);
}

#[test]
fn test_wai_idles_until_interrupt() {
    // WAI ; INY
    let mut cpu = setup_cpu(&[0xCB, 0xC8]);
    cpu.step().unwrap();
    assert!(cpu.is_waiting());

    let cycles = cpu.cycles();
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x0401);
    assert_eq!(cpu.cycles(), cycles);

    // Waking runs the next instruction; the IRQ is taken on the step after
    cpu.assert_irq();
    cpu.step().unwrap();
    assert!(!cpu.is_waiting());
    assert_eq!(cpu.y(), 1);
    assert_eq!(cpu.pc(), 0x0402);
    assert!(cpu.state().irq_asserted);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x3001);
    assert_eq!(cpu.x(), 1);
    assert!(!cpu.state().irq_asserted);
}

#[test]
fn test_masked_irq_releases_wai_without_service() {
    // SEI ; WAI ; INY
    let mut cpu = setup_cpu(&[0x78, 0xCB, 0xC8]);
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert!(cpu.is_waiting());

    cpu.assert_irq();
    cpu.step().unwrap();
    assert!(!cpu.is_waiting());
    assert_eq!(cpu.y(), 1);
    assert_eq!(cpu.pc(), 0x0403);
}

#[test]
fn test_brk_skips_signature_byte() {
    // BRK ; .byte $EA ; INY
    let mut cpu = setup_cpu(&[0x00, 0xEA, 0xC8]);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x3000);
    assert!(cpu.state().break_flag);
    assert_eq!(cpu.memory().peek(0x01FD) & 0x10, 0x10);

    // INX ; RTI
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x0402);
    cpu.step().unwrap();
    assert_eq!(cpu.y(), 1);
}

#[test]
fn test_interrupt_clears_decimal_mode() {
    // SED ; NOP
    let mut cpu = setup_cpu(&[0xF8, 0xEA]);
    cpu.step().unwrap();
    cpu.assert_nmi();
    cpu.step().unwrap();
    assert!(!cpu.state().decimal);

    // RTI restores it
    cpu.step().unwrap();
    assert!(cpu.state().decimal);
}

#[test]
fn test_uninitialised_vector_is_fatal() {
    let mut memory = FlatMemory::new();
    memory.load(0x0400, &[0xEA]);
    memory.load(IRQ_VECTOR, &[0xFF, 0xFF]);
    let mut cpu = CPU::new(memory, CpuConfig::default().unthrottled());

    cpu.assert_irq();
    assert_eq!(
        cpu.step(),
        Err(ExecutionError::InvalidVector { vector: IRQ_VECTOR })
    );
}

#[test]
fn test_clear_irq_withdraws_request() {
    let mut cpu = setup_cpu(&[0xEA]);
    cpu.assert_irq();
    cpu.clear_irq();
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x0401);
}
