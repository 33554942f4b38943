//! 65el02 Disassembler Module
//!
//! Converts binary machine code into human-readable assembly mnemonics.
//!
//! Immediate operands of the accumulator and index instructions change size
//! with the register widths, so a byte stream only has one correct decoding
//! for a given width setting. [`DisassemblyOptions`] carries that setting.

pub mod decoder;
pub mod formatter;

pub use formatter::format_instruction;

use crate::addressing::AddressingMode;
use crate::opcodes::OPCODE_TABLE;

/// A single disassembled instruction with full metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Memory address where this instruction starts
    pub address: u16,

    /// The opcode byte value (0x00-0xFF)
    pub opcode: u8,

    /// Instruction mnemonic (e.g., "LDA", "ENT", "MMU")
    pub mnemonic: &'static str,

    /// Addressing mode used by this instruction
    pub addressing_mode: AddressingMode,

    /// Operand bytes (0-2 bytes)
    pub operand_bytes: Vec<u8>,

    /// Total size in bytes (opcode + operands)
    pub size_bytes: u8,

    /// Base cycle cost under the CMOS timing model
    pub base_cycles: u8,
}

impl Instruction {
    /// Builds an instruction from an opcode and the operand bytes that
    /// followed it.
    pub fn new(address: u16, opcode: u8, operands: &[u8]) -> Self {
        let metadata = &OPCODE_TABLE[opcode as usize];
        Self {
            address,
            opcode,
            mnemonic: metadata.mnemonic,
            addressing_mode: metadata.addressing_mode,
            operand_bytes: operands.to_vec(),
            size_bytes: 1 + operands.len() as u8,
            base_cycles: metadata.cmos_cycles,
        }
    }

    fn data_byte(address: u16, value: u8) -> Self {
        Self {
            address,
            opcode: value,
            mnemonic: ".byte",
            addressing_mode: AddressingMode::Implied,
            operand_bytes: vec![value],
            size_bytes: 1,
            base_cycles: 0,
        }
    }
}

/// Options controlling disassembly output
#[derive(Debug, Clone, Copy, Default)]
pub struct DisassemblyOptions {
    /// Starting address for disassembly (affects address display)
    pub start_address: u16,

    /// Decode accumulator immediates as 16-bit
    pub wide_accumulator: bool,

    /// Decode index immediates as 16-bit
    pub wide_index: bool,
}

/// Disassemble a byte slice into a vector of instructions
///
/// Bytes that do not form a complete instruction (the trap opcode, or an
/// instruction truncated by the end of the slice) become `.byte` directives.
///
/// # Examples
///
/// ```
/// use lib65el02::disassembler::{disassemble, DisassemblyOptions};
/// use lib65el02::format_instruction;
///
/// let code = [0xA9, 0x42, 0x22, 0xEF, 0x01];
/// let listing: Vec<String> = disassemble(&code, DisassemblyOptions::default())
///     .iter()
///     .map(format_instruction)
///     .collect();
/// assert_eq!(listing, ["LDA #$42", "ENT", "MMU #$01"]);
/// ```
pub fn disassemble(bytes: &[u8], options: DisassemblyOptions) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut pc = 0;
    let mut address = options.start_address;

    while pc < bytes.len() {
        match decoder::decode_instruction(&bytes[pc..], address, options) {
            Some(instr) => {
                pc += instr.size_bytes as usize;
                address = address.wrapping_add(instr.size_bytes as u16);
                instructions.push(instr);
            }
            None => {
                instructions.push(Instruction::data_byte(address, bytes[pc]));
                pc += 1;
                address = address.wrapping_add(1);
            }
        }
    }

    instructions
}

/// Decodes the single instruction at the start of `bytes` with 8-bit widths.
pub fn disassemble_one(bytes: &[u8], address: u16) -> Option<Instruction> {
    decoder::decode_instruction(
        bytes,
        address,
        DisassemblyOptions {
            start_address: address,
            ..DisassemblyOptions::default()
        },
    )
}
