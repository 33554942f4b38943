//! Integration tests for the disassembler.
//!
//! Tests cover:
//! - 65el02 mnemonics and the register-stack addressing modes
//! - Width-dependent immediate operands
//! - Branch and PC-relative push targets
//! - `.byte` output for the trap opcode and truncated input

use lib65el02::disassembler::{disassemble, DisassemblyOptions};
use lib65el02::{disassemble_one, format_instruction, AddressingMode};

fn listing(bytes: &[u8], options: DisassemblyOptions) -> Vec<String> {
    disassemble(bytes, options)
        .iter()
        .map(format_instruction)
        .collect()
}

fn at(address: u16) -> DisassemblyOptions {
    DisassemblyOptions {
        start_address: address,
        ..DisassemblyOptions::default()
    }
}

// ========== Mnemonics ==========

#[test]
fn test_forth_threading_instructions() {
    let code = [0x22, 0x02, 0x42, 0x0B, 0x2B, 0x8B, 0xAB, 0x5C, 0xDC];
    assert_eq!(
        listing(&code, at(0x0400)),
        ["ENT", "NXT", "NXA", "RHI", "RLI", "TXR", "TRX", "TXI", "TIX"]
    );
}

#[test]
fn test_register_stack_operands() {
    let code = [0x07, 0x04, 0x17, 0x02, 0x44, 0x00, 0x30, 0x54, 0x10];
    assert_eq!(
        listing(&code, at(0x0400)),
        ["ORA $04,R", "ORA ($02,R),Y", "REA $3000", "REI ($10)"]
    );
}

#[test]
fn test_accumulator_extension_instructions() {
    let code = [0x8F, 0x9F, 0xAF, 0xBF, 0xEB, 0xFB, 0xEF, 0x81, 0x0F, 0x40, 0x4F, 0x41];
    assert_eq!(
        listing(&code, at(0x0400)),
        ["ZEA", "SEA", "TDA", "TAD", "XBA", "XCE", "MMU #$81", "MUL $40", "DIV $41"]
    );
}

#[test]
fn test_stack_relative_forms() {
    let instr = disassemble_one(&[0xA3, 0x03], 0x0400).unwrap();
    assert_eq!(instr.addressing_mode, AddressingMode::StackRelative);
    assert_eq!(format_instruction(&instr), "LDA $03,S");
}

// ========== Operand Widths ==========

#[test]
fn test_register_widths_change_decoding() {
    // REP #$30 ; LDA #$1234 ; LDX #$0010 ; STP
    let code = [0xC2, 0x30, 0xA9, 0x34, 0x12, 0xA2, 0x10, 0x00, 0xDB];

    let wide = DisassemblyOptions {
        start_address: 0x0400,
        wide_accumulator: true,
        wide_index: true,
    };
    assert_eq!(
        listing(&code, wide),
        ["REP #$30", "LDA #$1234", "LDX #$0010", "STP"]
    );

    // The same bytes read with 8-bit registers
    assert_eq!(
        listing(&code, at(0x0400)),
        ["REP #$30", "LDA #$34", "ORA ($A2)", "BPL $0408", "STP"]
    );
}

#[test]
fn test_width_flags_are_independent() {
    let options = DisassemblyOptions {
        wide_index: true,
        ..DisassemblyOptions::default()
    };
    assert_eq!(
        listing(&[0xA9, 0x01, 0xA0, 0x02, 0x00], options),
        ["LDA #$01", "LDY #$0002"]
    );
}

// ========== Relative Targets ==========

#[test]
fn test_branch_targets() {
    // BNE back to the start ; BRA forward
    let code = [0xD0, 0xFE, 0x80, 0x10];
    assert_eq!(listing(&code, at(0x0400)), ["BNE $0400", "BRA $0414"]);
}

#[test]
fn test_pc_relative_pushes_add_unsigned() {
    let code = [0x62, 0xF0, 0x82, 0x80];
    assert_eq!(listing(&code, at(0x0400)), ["PER $04F2", "RER $0484"]);
}

// ========== Data Bytes ==========

#[test]
fn test_trap_opcode_is_data() {
    let instructions = disassemble(&[0xEA, 0xFF, 0xEA], at(0x0400));
    assert_eq!(instructions.len(), 3);
    assert_eq!(instructions[1].address, 0x0401);
    assert_eq!(format_instruction(&instructions[1]), ".byte $FF");
    assert_eq!(instructions[2].address, 0x0402);
}

#[test]
fn test_truncated_tail_is_data() {
    let lines = listing(&[0xEA, 0x8D, 0x00], at(0x0400));
    assert_eq!(lines, ["NOP", ".byte $8D", "BRK"]);
    assert!(disassemble_one(&[0x8D, 0x00], 0x0400).is_none());
}
