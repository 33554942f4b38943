//! # Opcode Metadata Table
//!
//! The 256-entry table describing every 65el02 opcode: mnemonic, addressing
//! mode, encoded size and the nominal clock counts for both timing models.
//!
//! Every byte value except `0xFF` decodes to an instruction. The `nmos` column
//! marks the 151 opcodes of the original NMOS 6502; in classic mode all other
//! opcodes execute as no-ops and the NMOS clock counts apply.

use crate::addressing::AddressingMode;
use crate::addressing::AddressingMode::*;

/// Metadata for a single opcode.
///
/// # Examples
///
/// ```
/// use lib65el02::{AddressingMode, OPCODE_TABLE};
///
/// let lda_imm = &OPCODE_TABLE[0xA9];
/// assert_eq!(lda_imm.mnemonic, "LDA");
/// assert_eq!(lda_imm.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(lda_imm.size_bytes, 2);
/// assert!(lda_imm.nmos);
///
/// let mul = &OPCODE_TABLE[0x0F];
/// assert_eq!(mul.mnemonic, "MUL");
/// assert!(!mul.nmos);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic.
    pub mnemonic: &'static str,

    /// Addressing mode used for operand fetch and disassembly.
    pub addressing_mode: AddressingMode,

    /// Encoded size with 8-bit registers (opcode + operands).
    ///
    /// Immediate forms grow by one byte when their register is 16 bits wide;
    /// use [`CpuState::instruction_size`](crate::CpuState::instruction_size)
    /// for the width-adjusted value. `NUL` (0xFF) is recorded as 0 and
    /// decodes as a single byte.
    pub size_bytes: u8,

    /// Clock cycles under the NMOS timing model (classic mode).
    pub nmos_cycles: u8,

    /// Clock cycles under the CMOS timing model.
    pub cmos_cycles: u8,

    /// Whether the opcode belongs to the base NMOS 6502 instruction set.
    pub nmos: bool,
}

impl OpcodeMetadata {
    /// Nominal clock count for the selected timing model.
    pub fn cycles(&self, classic: bool) -> u8 {
        if classic {
            self.nmos_cycles
        } else {
            self.cmos_cycles
        }
    }
}

const fn op(
    mnemonic: &'static str,
    addressing_mode: AddressingMode,
    size_bytes: u8,
    nmos_cycles: u8,
    cmos_cycles: u8,
    nmos: bool,
) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic,
        addressing_mode,
        size_bytes,
        nmos_cycles,
        cmos_cycles,
        nmos,
    }
}

/// The opcode that traps: not part of any supported instruction set.
pub const TRAP_OPCODE: u8 = 0xFF;

/// Complete 256-entry opcode table indexed by opcode byte.
///
/// # Examples
///
/// ```
/// use lib65el02::OPCODE_TABLE;
///
/// let brk = &OPCODE_TABLE[0x00];
/// assert_eq!(brk.mnemonic, "BRK");
/// assert_eq!(brk.cmos_cycles, 7);
///
/// assert_eq!(OPCODE_TABLE.iter().filter(|m| m.nmos).count(), 151);
/// ```
pub const OPCODE_TABLE: [OpcodeMetadata; 256] = [
    op("BRK", Implied, 1, 7, 7, true), // 0x00
    op("ORA", IndexedIndirectX, 2, 6, 6, true), // 0x01
    op("NXT", Implied, 1, 1, 2, false), // 0x02
    op("ORA", StackRelative, 2, 8, 1, false), // 0x03
    op("TSB", ZeroPage, 2, 3, 5, false), // 0x04
    op("ORA", ZeroPage, 2, 3, 3, true), // 0x05
    op("ASL", ZeroPage, 2, 5, 5, true), // 0x06
    op("ORA", RegisterRelative, 2, 5, 5, false), // 0x07
    op("PHP", Implied, 1, 3, 3, true), // 0x08
    op("ORA", Immediate, 2, 2, 2, true), // 0x09
    op("ASL", Accumulator, 1, 2, 2, true), // 0x0A
    op("RHI", Implied, 1, 2, 1, false), // 0x0B
    op("TSB", Absolute, 3, 4, 6, false), // 0x0C
    op("ORA", Absolute, 3, 4, 4, true), // 0x0D
    op("ASL", Absolute, 3, 6, 6, true), // 0x0E
    op("MUL", ZeroPage, 2, 6, 5, false), // 0x0F
    op("BPL", Relative, 2, 2, 2, true), // 0x10
    op("ORA", IndirectIndexedY, 2, 5, 5, true), // 0x11
    op("ORA", ZeroPageIndirect, 2, 1, 5, false), // 0x12
    op("ORA", StackRelativeIndirectY, 2, 8, 1, false), // 0x13
    op("TRB", ZeroPage, 2, 4, 5, false), // 0x14
    op("ORA", ZeroPageX, 2, 4, 4, true), // 0x15
    op("ASL", ZeroPageX, 2, 6, 6, true), // 0x16
    op("ORA", RegisterRelativeIndirectY, 2, 6, 5, false), // 0x17
    op("CLC", Implied, 1, 2, 2, true), // 0x18
    op("ORA", AbsoluteY, 3, 4, 4, true), // 0x19
    op("INC", Accumulator, 1, 2, 2, false), // 0x1A
    op("RHX", Implied, 1, 7, 1, false), // 0x1B
    op("TRB", Absolute, 3, 4, 6, false), // 0x1C
    op("ORA", AbsoluteX, 3, 4, 4, true), // 0x1D
    op("ASL", AbsoluteX, 3, 7, 6, true), // 0x1E
    op("MUL", ZeroPageX, 2, 7, 5, false), // 0x1F
    op("JSR", Absolute, 3, 6, 6, true), // 0x20
    op("AND", IndexedIndirectX, 2, 6, 6, true), // 0x21
    op("ENT", Implied, 1, 1, 2, false), // 0x22
    op("AND", StackRelative, 2, 8, 1, false), // 0x23
    op("BIT", ZeroPage, 2, 3, 3, true), // 0x24
    op("AND", ZeroPage, 2, 3, 3, true), // 0x25
    op("ROL", ZeroPage, 2, 5, 5, true), // 0x26
    op("AND", RegisterRelative, 2, 5, 5, false), // 0x27
    op("PLP", Implied, 1, 4, 4, true), // 0x28
    op("AND", Immediate, 2, 2, 2, true), // 0x29
    op("ROL", Accumulator, 1, 2, 2, true), // 0x2A
    op("RLI", Implied, 1, 2, 1, false), // 0x2B
    op("BIT", Absolute, 3, 4, 4, true), // 0x2C
    op("AND", Absolute, 3, 4, 4, true), // 0x2D
    op("ROL", Absolute, 3, 6, 6, true), // 0x2E
    op("MUL", Absolute, 3, 6, 5, false), // 0x2F
    op("BMI", Relative, 2, 2, 2, true), // 0x30
    op("AND", IndirectIndexedY, 2, 5, 5, true), // 0x31
    op("AND", ZeroPageIndirect, 2, 1, 5, false), // 0x32
    op("AND", StackRelativeIndirectY, 2, 8, 1, false), // 0x33
    op("BIT", ZeroPageX, 2, 4, 4, false), // 0x34
    op("AND", ZeroPageX, 2, 4, 4, true), // 0x35
    op("ROL", ZeroPageX, 2, 6, 6, true), // 0x36
    op("AND", RegisterRelativeIndirectY, 2, 6, 5, false), // 0x37
    op("SEC", Implied, 1, 2, 2, true), // 0x38
    op("AND", AbsoluteY, 3, 4, 4, true), // 0x39
    op("DEC", Accumulator, 1, 2, 2, false), // 0x3A
    op("RLX", Implied, 1, 7, 1, false), // 0x3B
    op("BIT", AbsoluteX, 3, 4, 4, false), // 0x3C
    op("AND", AbsoluteX, 3, 4, 4, true), // 0x3D
    op("ROL", AbsoluteX, 3, 7, 6, true), // 0x3E
    op("MUL", AbsoluteX, 3, 7, 5, false), // 0x3F
    op("RTI", Implied, 1, 6, 6, true), // 0x40
    op("EOR", IndexedIndirectX, 2, 6, 6, true), // 0x41
    op("NXA", Implied, 1, 1, 2, false), // 0x42
    op("EOR", StackRelative, 2, 8, 1, false), // 0x43
    op("REA", Absolute, 3, 3, 2, false), // 0x44
    op("EOR", ZeroPage, 2, 3, 3, true), // 0x45
    op("LSR", ZeroPage, 2, 5, 5, true), // 0x46
    op("EOR", RegisterRelative, 2, 5, 3, false), // 0x47
    op("PHA", Implied, 1, 3, 3, true), // 0x48
    op("EOR", Immediate, 2, 2, 2, true), // 0x49
    op("LSR", Accumulator, 1, 2, 2, true), // 0x4A
    op("RHA", Implied, 1, 2, 1, false), // 0x4B
    op("JMP", Absolute, 3, 3, 3, true), // 0x4C
    op("EOR", Absolute, 3, 4, 4, true), // 0x4D
    op("LSR", Absolute, 3, 6, 6, true), // 0x4E
    op("DIV", ZeroPage, 2, 6, 5, false), // 0x4F
    op("BVC", Relative, 2, 2, 2, true), // 0x50
    op("EOR", IndirectIndexedY, 2, 5, 5, true), // 0x51
    op("EOR", ZeroPageIndirect, 2, 1, 5, false), // 0x52
    op("EOR", StackRelativeIndirectY, 2, 8, 1, false), // 0x53
    op("REI", ZeroPageIndirect, 2, 4, 4, false), // 0x54
    op("EOR", ZeroPageX, 2, 4, 4, true), // 0x55
    op("LSR", ZeroPageX, 2, 6, 6, true), // 0x56
    op("EOR", RegisterRelativeIndirectY, 2, 6, 5, false), // 0x57
    op("CLI", Implied, 1, 2, 2, true), // 0x58
    op("EOR", AbsoluteY, 3, 4, 4, true), // 0x59
    op("PHY", Implied, 1, 2, 3, false), // 0x5A
    op("RHY", Implied, 1, 7, 1, false), // 0x5B
    op("TXI", Implied, 1, 4, 8, false), // 0x5C
    op("EOR", AbsoluteX, 3, 4, 4, true), // 0x5D
    op("LSR", AbsoluteX, 3, 7, 6, true), // 0x5E
    op("DIV", ZeroPageX, 2, 7, 5, false), // 0x5F
    op("RTS", Implied, 1, 6, 6, true), // 0x60
    op("ADC", IndexedIndirectX, 2, 6, 6, true), // 0x61
    op("PER", Relative, 2, 1, 2, false), // 0x62
    op("ADC", StackRelative, 2, 8, 1, false), // 0x63
    op("STZ", ZeroPage, 2, 3, 3, false), // 0x64
    op("ADC", ZeroPage, 2, 3, 3, true), // 0x65
    op("ROR", ZeroPage, 2, 5, 5, true), // 0x66
    op("ADC", RegisterRelative, 2, 5, 5, false), // 0x67
    op("PLA", Implied, 1, 4, 4, true), // 0x68
    op("ADC", Immediate, 2, 2, 2, true), // 0x69
    op("ROR", Accumulator, 1, 2, 2, true), // 0x6A
    op("RLA", Implied, 1, 2, 1, false), // 0x6B
    op("JMP", Indirect, 3, 5, 6, true), // 0x6C
    op("ADC", Absolute, 3, 4, 4, true), // 0x6D
    op("ROR", Absolute, 3, 6, 6, true), // 0x6E
    op("DIV", Absolute, 3, 6, 5, false), // 0x6F
    op("BVS", Relative, 2, 2, 2, true), // 0x70
    op("ADC", IndirectIndexedY, 2, 5, 5, true), // 0x71
    op("ADC", ZeroPageIndirect, 2, 1, 5, false), // 0x72
    op("ADC", StackRelativeIndirectY, 2, 8, 1, false), // 0x73
    op("STZ", ZeroPageX, 2, 4, 4, false), // 0x74
    op("ADC", ZeroPageX, 2, 4, 4, true), // 0x75
    op("ROR", ZeroPageX, 2, 6, 6, true), // 0x76
    op("ADC", RegisterRelativeIndirectY, 2, 6, 5, false), // 0x77
    op("SEI", Implied, 1, 2, 2, true), // 0x78
    op("ADC", AbsoluteY, 3, 4, 4, true), // 0x79
    op("PLY", Implied, 1, 2, 4, false), // 0x7A
    op("RLY", Implied, 1, 7, 3, false), // 0x7B
    op("JMP", AbsoluteIndexedIndirect, 3, 4, 6, false), // 0x7C
    op("ADC", AbsoluteX, 3, 4, 4, true), // 0x7D
    op("ROR", AbsoluteX, 3, 7, 6, true), // 0x7E
    op("DIV", AbsoluteX, 3, 7, 5, false), // 0x7F
    op("BRA", Relative, 2, 2, 3, false), // 0x80
    op("STA", IndexedIndirectX, 2, 6, 6, true), // 0x81
    op("RER", Relative, 2, 2, 2, false), // 0x82
    op("STA", StackRelative, 2, 6, 1, false), // 0x83
    op("STY", ZeroPage, 2, 3, 3, true), // 0x84
    op("STA", ZeroPage, 2, 3, 3, true), // 0x85
    op("STX", ZeroPage, 2, 3, 3, true), // 0x86
    op("STA", RegisterRelative, 2, 3, 5, false), // 0x87
    op("DEY", Implied, 1, 2, 2, true), // 0x88
    op("BIT", Immediate, 2, 2, 2, false), // 0x89
    op("TXA", Implied, 1, 2, 2, true), // 0x8A
    op("TXR", Implied, 1, 2, 1, false), // 0x8B
    op("STY", Absolute, 3, 4, 4, true), // 0x8C
    op("STA", Absolute, 3, 4, 4, true), // 0x8D
    op("STX", Absolute, 3, 4, 4, true), // 0x8E
    op("ZEA", Implied, 1, 4, 5, false), // 0x8F
    op("BCC", Relative, 2, 2, 2, true), // 0x90
    op("STA", IndirectIndexedY, 2, 6, 6, true), // 0x91
    op("STA", ZeroPageIndirect, 2, 1, 5, false), // 0x92
    op("STA", StackRelativeIndirectY, 2, 6, 1, false), // 0x93
    op("STY", ZeroPageX, 2, 4, 4, true), // 0x94
    op("STA", ZeroPageX, 2, 4, 4, true), // 0x95
    op("STX", ZeroPageY, 2, 4, 4, true), // 0x96
    op("STA", RegisterRelativeIndirectY, 2, 4, 5, false), // 0x97
    op("TYA", Implied, 1, 2, 2, true), // 0x98
    op("STA", AbsoluteY, 3, 5, 5, true), // 0x99
    op("TXS", Implied, 1, 2, 2, true), // 0x9A
    op("TXY", Implied, 1, 5, 1, false), // 0x9B
    op("STZ", Absolute, 3, 5, 4, false), // 0x9C
    op("STA", AbsoluteX, 3, 5, 5, true), // 0x9D
    op("STZ", AbsoluteX, 3, 5, 5, false), // 0x9E
    op("SEA", Implied, 1, 5, 5, false), // 0x9F
    op("LDY", Immediate, 2, 2, 2, true), // 0xA0
    op("LDA", IndexedIndirectX, 2, 6, 6, true), // 0xA1
    op("LDX", Immediate, 2, 2, 2, true), // 0xA2
    op("LDA", StackRelative, 2, 6, 1, false), // 0xA3
    op("LDY", ZeroPage, 2, 3, 3, true), // 0xA4
    op("LDA", ZeroPage, 2, 3, 3, true), // 0xA5
    op("LDX", ZeroPage, 2, 3, 3, true), // 0xA6
    op("LDA", RegisterRelative, 2, 3, 5, false), // 0xA7
    op("TAY", Implied, 1, 2, 2, true), // 0xA8
    op("LDA", Immediate, 2, 2, 2, true), // 0xA9
    op("TAX", Implied, 1, 2, 2, true), // 0xAA
    op("TRX", Implied, 1, 2, 1, false), // 0xAB
    op("LDY", Absolute, 3, 4, 4, true), // 0xAC
    op("LDA", Absolute, 3, 4, 4, true), // 0xAD
    op("LDX", Absolute, 3, 4, 4, true), // 0xAE
    op("TDA", Implied, 1, 4, 5, false), // 0xAF
    op("BCS", Relative, 2, 2, 2, true), // 0xB0
    op("LDA", IndirectIndexedY, 2, 5, 5, true), // 0xB1
    op("LDA", ZeroPageIndirect, 2, 1, 5, false), // 0xB2
    op("LDA", StackRelativeIndirectY, 2, 5, 1, false), // 0xB3
    op("LDY", ZeroPageX, 2, 4, 4, true), // 0xB4
    op("LDA", ZeroPageX, 2, 4, 4, true), // 0xB5
    op("LDX", ZeroPageY, 2, 4, 4, true), // 0xB6
    op("LDA", RegisterRelativeIndirectY, 2, 4, 5, false), // 0xB7
    op("CLV", Implied, 1, 2, 2, true), // 0xB8
    op("LDA", AbsoluteY, 3, 4, 4, true), // 0xB9
    op("TSX", Implied, 1, 2, 2, true), // 0xBA
    op("TYX", Implied, 1, 4, 1, false), // 0xBB
    op("LDY", AbsoluteX, 3, 4, 4, true), // 0xBC
    op("LDA", AbsoluteX, 3, 4, 4, true), // 0xBD
    op("LDX", AbsoluteY, 3, 4, 4, true), // 0xBE
    op("TAD", Implied, 1, 4, 5, false), // 0xBF
    op("CPY", Immediate, 2, 2, 2, true), // 0xC0
    op("CMP", IndexedIndirectX, 2, 6, 6, true), // 0xC1
    op("REP", Immediate, 2, 2, 2, false), // 0xC2
    op("CMP", StackRelative, 2, 8, 1, false), // 0xC3
    op("CPY", ZeroPage, 2, 3, 3, true), // 0xC4
    op("CMP", ZeroPage, 2, 3, 3, true), // 0xC5
    op("DEC", ZeroPage, 2, 5, 5, true), // 0xC6
    op("CMP", RegisterRelative, 2, 5, 5, false), // 0xC7
    op("INY", Implied, 1, 2, 2, true), // 0xC8
    op("CMP", Immediate, 2, 2, 2, true), // 0xC9
    op("DEX", Implied, 1, 2, 2, true), // 0xCA
    op("WAI", Implied, 1, 2, 3, false), // 0xCB
    op("CPY", Absolute, 3, 4, 4, true), // 0xCC
    op("CMP", Absolute, 3, 4, 4, true), // 0xCD
    op("DEC", Absolute, 3, 6, 6, true), // 0xCE
    op("PLD", Implied, 1, 6, 5, false), // 0xCF
    op("BNE", Relative, 2, 2, 2, true), // 0xD0
    op("CMP", IndirectIndexedY, 2, 5, 5, true), // 0xD1
    op("CMP", ZeroPageIndirect, 2, 1, 5, false), // 0xD2
    op("CMP", StackRelativeIndirectY, 2, 8, 1, false), // 0xD3
    op("PEI", ZeroPageIndirect, 2, 4, 4, false), // 0xD4
    op("CMP", ZeroPageX, 2, 4, 4, true), // 0xD5
    op("DEC", ZeroPageX, 2, 6, 6, true), // 0xD6
    op("CMP", RegisterRelativeIndirectY, 2, 6, 5, false), // 0xD7
    op("CLD", Implied, 1, 2, 2, true), // 0xD8
    op("CMP", AbsoluteY, 3, 4, 4, true), // 0xD9
    op("PHX", Implied, 1, 2, 3, false), // 0xDA
    op("STP", Implied, 1, 7, 3, false), // 0xDB
    op("TIX", Implied, 1, 4, 4, false), // 0xDC
    op("CMP", AbsoluteX, 3, 4, 4, true), // 0xDD
    op("DEC", AbsoluteX, 3, 7, 7, true), // 0xDE
    op("PHD", Implied, 1, 7, 5, false), // 0xDF
    op("CPX", Immediate, 2, 2, 2, true), // 0xE0
    op("SBC", IndexedIndirectX, 2, 6, 6, true), // 0xE1
    op("SEP", Immediate, 2, 2, 2, false), // 0xE2
    op("SBC", StackRelative, 2, 8, 1, false), // 0xE3
    op("CPX", ZeroPage, 2, 3, 3, true), // 0xE4
    op("SBC", ZeroPage, 2, 3, 3, true), // 0xE5
    op("INC", ZeroPage, 2, 5, 5, true), // 0xE6
    op("SBC", RegisterRelative, 2, 5, 5, false), // 0xE7
    op("INX", Implied, 1, 2, 2, true), // 0xE8
    op("SBC", Immediate, 2, 2, 2, true), // 0xE9
    op("NOP", Implied, 1, 2, 2, true), // 0xEA
    op("XBA", Implied, 1, 2, 1, false), // 0xEB
    op("CPX", Absolute, 3, 4, 4, true), // 0xEC
    op("SBC", Absolute, 3, 4, 4, true), // 0xED
    op("INC", Absolute, 3, 6, 6, true), // 0xEE
    op("MMU", Immediate, 2, 6, 5, false), // 0xEF
    op("BEQ", Relative, 2, 2, 2, true), // 0xF0
    op("SBC", IndirectIndexedY, 2, 5, 5, true), // 0xF1
    op("SBC", ZeroPageIndirect, 2, 1, 5, false), // 0xF2
    op("SBC", StackRelativeIndirectY, 2, 8, 1, false), // 0xF3
    op("PEA", Absolute, 3, 4, 4, false), // 0xF4
    op("SBC", ZeroPageX, 2, 4, 4, true), // 0xF5
    op("INC", ZeroPageX, 2, 6, 6, true), // 0xF6
    op("SBC", RegisterRelativeIndirectY, 2, 6, 5, false), // 0xF7
    op("SED", Implied, 1, 2, 2, true), // 0xF8
    op("SBC", AbsoluteY, 3, 4, 4, true), // 0xF9
    op("PLX", Implied, 1, 2, 4, false), // 0xFA
    op("XCE", Implied, 1, 7, 1, false), // 0xFB
    op("JSR", AbsoluteIndexedIndirect, 3, 4, 4, false), // 0xFC
    op("SBC", AbsoluteX, 3, 4, 4, true), // 0xFD
    op("INC", AbsoluteX, 3, 7, 7, true), // 0xFE
    op("NUL", Implied, 0, 7, 5, false), // 0xFF
];
