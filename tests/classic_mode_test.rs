//! Integration tests for classic (NMOS) mode and clock throttling.
//!
//! Tests cover:
//! - CMOS and 65el02 opcodes degrading to no-ops that still consume operands
//! - NMOS clock counts
//! - The JMP indirect page-wrap bug
//! - Decimal-mode N flag differences
//! - Wall-clock pacing at a slow clock preset

use std::time::{Duration, Instant};

use lib65el02::{ClockSpeed, CpuConfig, FlatMemory, CPU};

fn setup_cpu(program: &[u8], classic: bool) -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.load(0x0400, program);
    let config = CpuConfig::default()
        .unthrottled()
        .with_classic_mode(classic);
    CPU::new(memory, config)
}

// ========== Opcode Set ==========

#[test]
fn test_extended_opcodes_are_skipped() {
    // LDA #$10 ; INC A ; MUL $40 ; PHX ; LDX #$01
    let program = [0xA9, 0x10, 0x1A, 0x0F, 0x40, 0xDA, 0xA2, 0x01];
    let mut cpu = setup_cpu(&program, true);
    cpu.memory_mut().load(0x0040, &[0x03]);

    for _ in 0..5 {
        cpu.step().unwrap();
    }
    assert_eq!(cpu.a(), 0x10);
    assert_eq!(cpu.d(), 0);
    assert_eq!(cpu.sp(), 0x0200);
    assert_eq!(cpu.x(), 0x01);
    assert_eq!(cpu.pc(), 0x0408);
}

#[test]
fn test_extended_opcodes_run_outside_classic_mode() {
    // LDA #$10 ; INC A ; MUL $40
    let mut cpu = setup_cpu(&[0xA9, 0x10, 0x1A, 0x0F, 0x40], false);
    cpu.memory_mut().load(0x0040, &[0x03]);

    for _ in 0..3 {
        cpu.step().unwrap();
    }
    assert_eq!(cpu.a(), 0x33);
}

#[test]
fn test_trap_opcode_still_traps() {
    let mut cpu = setup_cpu(&[0xFF, 0xEA], true);
    cpu.step().unwrap();
    assert!(cpu.state().op_trap);
    assert_eq!(cpu.pc(), 0x0401);

    cpu.step().unwrap();
    assert!(!cpu.state().op_trap);
}

// ========== Timing ==========

#[test]
fn test_nmos_cycle_counts() {
    // JMP ($3000) ; target: MUL $40
    let program = [0x6C, 0x00, 0x30];

    let mut classic = setup_cpu(&program, true);
    classic.memory_mut().load(0x3000, &[0x00, 0x05]);
    classic.memory_mut().load(0x0500, &[0x0F, 0x40]);
    classic.step().unwrap();
    assert_eq!(classic.cycles(), 5);
    classic.step().unwrap();
    assert_eq!(classic.cycles(), 11);

    let mut cmos = setup_cpu(&program, false);
    cmos.memory_mut().load(0x3000, &[0x00, 0x05]);
    cmos.memory_mut().load(0x0500, &[0x0F, 0x40]);
    cmos.step().unwrap();
    assert_eq!(cmos.cycles(), 6);
    cmos.step().unwrap();
    assert_eq!(cmos.cycles(), 11);
}

#[test]
fn test_throttled_run_paces_wall_clock() {
    // NOP ; NOP ; NOP at 500 Hz: 6 cycles of 2 ms each
    let mut memory = FlatMemory::new();
    memory.load(0x0400, &[0xEA, 0xEA, 0xEA]);
    let config = CpuConfig::default().with_clock_speed(ClockSpeed::Hz500);
    let mut cpu = CPU::new(memory, config);

    let started = Instant::now();
    for _ in 0..3 {
        cpu.step().unwrap();
    }
    assert!(started.elapsed() >= Duration::from_millis(12));
    assert_eq!(cpu.cycles(), 6);
}

// ========== NMOS Quirks ==========

#[test]
fn test_jmp_indirect_wraps_within_page() {
    // JMP ($30FF)
    let mut cpu = setup_cpu(&[0x6C, 0xFF, 0x30], true);
    cpu.memory_mut().load(0x30FF, &[0x00]);
    cpu.memory_mut().load(0x3000, &[0x06]);
    cpu.memory_mut().load(0x3100, &[0x07]);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x0600);
}

#[test]
fn test_decimal_result_never_negative() {
    // SED ; CLC ; LDA #$50 ; ADC #$40
    let program = [0xF8, 0x18, 0xA9, 0x50, 0x69, 0x40];

    let mut classic = setup_cpu(&program, true);
    let mut cmos = setup_cpu(&program, false);
    for _ in 0..4 {
        classic.step().unwrap();
        cmos.step().unwrap();
    }

    assert_eq!(classic.a(), 0x90);
    assert_eq!(cmos.a(), 0x90);
    assert!(!classic.state().negative);
    assert!(cmos.state().negative);
}
