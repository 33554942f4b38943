//! Instruction decoder for the 65el02 disassembler

use crate::disassembler::{DisassemblyOptions, Instruction};
use crate::opcodes::{OPCODE_TABLE, TRAP_OPCODE};

/// Encoded size of `opcode` under the register widths in `options`.
fn encoded_size(opcode: u8, options: DisassemblyOptions) -> usize {
    let size = OPCODE_TABLE[opcode as usize].size_bytes as usize;
    match opcode {
        0x09 | 0x29 | 0x49 | 0x69 | 0x89 | 0xA9 | 0xC9 | 0xE9 if options.wide_accumulator => 3,
        0xA0 | 0xA2 | 0xC0 | 0xE0 if options.wide_index => 3,
        _ => size,
    }
}

/// Decode a single instruction from a byte slice
///
/// # Returns
///
/// `Some(Instruction)` for a complete instruction, `None` for the trap
/// opcode or when the slice ends before the operands do.
pub fn decode_instruction(
    bytes: &[u8],
    address: u16,
    options: DisassemblyOptions,
) -> Option<Instruction> {
    let &opcode = bytes.first()?;
    if opcode == TRAP_OPCODE {
        return None;
    }

    let size = encoded_size(opcode, options);
    if bytes.len() < size {
        return None;
    }

    Some(Instruction::new(address, opcode, &bytes[1..size]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::AddressingMode;

    #[test]
    fn test_decode_lda_immediate() {
        let bytes = &[0xA9, 0x42];
        let instr = decode_instruction(bytes, 0x8000, DisassemblyOptions::default()).unwrap();

        assert_eq!(instr.address, 0x8000);
        assert_eq!(instr.opcode, 0xA9);
        assert_eq!(instr.mnemonic, "LDA");
        assert_eq!(instr.addressing_mode, AddressingMode::Immediate);
        assert_eq!(instr.operand_bytes, vec![0x42]);
        assert_eq!(instr.size_bytes, 2);
    }

    #[test]
    fn test_decode_stack_relative() {
        let bytes = &[0xB3, 0x04];
        let instr = decode_instruction(bytes, 0x0000, DisassemblyOptions::default()).unwrap();

        assert_eq!(instr.mnemonic, "LDA");
        assert_eq!(instr.addressing_mode, AddressingMode::StackRelativeIndirectY);
        assert_eq!(instr.size_bytes, 2);
    }

    #[test]
    fn test_decode_wide_index_immediate() {
        let options = DisassemblyOptions {
            wide_index: true,
            ..DisassemblyOptions::default()
        };
        let instr = decode_instruction(&[0xA0, 0x00, 0x10], 0x0400, options).unwrap();
        assert_eq!(instr.size_bytes, 3);
        assert_eq!(instr.operand_bytes, vec![0x00, 0x10]);

        assert!(decode_instruction(&[0xA0, 0x00], 0x0400, options).is_none());
    }

    #[test]
    fn test_decode_trap() {
        assert!(decode_instruction(&[0xFF], 0x1000, DisassemblyOptions::default()).is_none());
        assert!(decode_instruction(&[], 0x1000, DisassemblyOptions::default()).is_none());
    }
}
