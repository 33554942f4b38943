//! Formatting functions for disassembled instructions

use crate::addressing::AddressingMode;
use crate::disassembler::Instruction;

/// Format an instruction as assembly text
///
/// # Examples
///
/// ```
/// use lib65el02::{disassemble_one, format_instruction};
///
/// let instr = disassemble_one(&[0x13, 0x04], 0x0400).unwrap();
/// assert_eq!(format_instruction(&instr), "ORA ($04,S),Y");
/// ```
pub fn format_instruction(instr: &Instruction) -> String {
    let operand = format_operand(instr);

    if operand.is_empty() {
        instr.mnemonic.to_string()
    } else {
        format!("{} {}", instr.mnemonic, operand)
    }
}

fn byte_operand(instr: &Instruction) -> Option<u8> {
    instr.operand_bytes.first().copied()
}

fn word_operand(instr: &Instruction) -> Option<u16> {
    match instr.operand_bytes.as_slice() {
        [lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

fn format_operand(instr: &Instruction) -> String {
    use AddressingMode::*;

    // Data bytes (trap opcode, truncated input)
    if instr.mnemonic == ".byte" {
        return format!("${:02X}", instr.opcode);
    }

    let zp = |pattern: &str| match byte_operand(instr) {
        Some(value) => pattern.replace("{}", &format!("${:02X}", value)),
        None => pattern.replace("{}", "$??"),
    };
    let abs = |pattern: &str| match word_operand(instr) {
        Some(value) => pattern.replace("{}", &format!("${:04X}", value)),
        None => pattern.replace("{}", "$????"),
    };

    match instr.addressing_mode {
        Implied => String::new(),
        Accumulator => "A".to_string(),
        Immediate => match word_operand(instr) {
            Some(value) => format!("#${:04X}", value),
            None => zp("#{}"),
        },
        ZeroPage => zp("{}"),
        ZeroPageX => zp("{},X"),
        ZeroPageY => zp("{},Y"),
        ZeroPageIndirect => zp("({})"),
        IndexedIndirectX => zp("({},X)"),
        IndirectIndexedY => zp("({}),Y"),
        StackRelative => zp("{},S"),
        StackRelativeIndirectY => zp("({},S),Y"),
        RegisterRelative => zp("{},R"),
        RegisterRelativeIndirectY => zp("({},R),Y"),
        Relative => match byte_operand(instr) {
            Some(offset) => {
                let next = instr.address.wrapping_add(u16::from(instr.size_bytes));
                // PER and RER add the operand unsigned
                let target = match instr.opcode {
                    0x62 | 0x82 => next.wrapping_add(u16::from(offset)),
                    _ => next.wrapping_add_signed(i16::from(offset as i8)),
                };
                format!("${:04X}", target)
            }
            None => "$????".to_string(),
        },
        Absolute => abs("{}"),
        AbsoluteX => abs("{},X"),
        AbsoluteY => abs("{},Y"),
        Indirect => abs("({})"),
        AbsoluteIndexedIndirect => abs("({},X)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(address: u16, bytes: &[u8]) -> String {
        format_instruction(&Instruction::new(address, bytes[0], &bytes[1..]))
    }

    #[test]
    fn test_format_immediate() {
        assert_eq!(format(0x8000, &[0xA9, 0x42]), "LDA #$42");
        assert_eq!(format(0x8000, &[0xA9, 0x34, 0x12]), "LDA #$1234");
    }

    #[test]
    fn test_format_absolute() {
        assert_eq!(format(0x0000, &[0x8D, 0x00, 0x80]), "STA $8000");
        assert_eq!(format(0x0000, &[0x7C, 0x00, 0x30]), "JMP ($3000,X)");
    }

    #[test]
    fn test_format_implied() {
        assert_eq!(format(0x1000, &[0xEA]), "NOP");
        assert_eq!(format(0x1000, &[0x1A]), "INC A");
    }

    #[test]
    fn test_format_65el02_modes() {
        assert_eq!(format(0, &[0x07, 0x02]), "ORA $02,R");
        assert_eq!(format(0, &[0x77, 0x02]), "ADC ($02,R),Y");
        assert_eq!(format(0, &[0xA3, 0x01]), "LDA $01,S");
        assert_eq!(format(0, &[0xB2, 0x10]), "LDA ($10)");
    }

    #[test]
    fn test_format_relative() {
        assert_eq!(format(0x0400, &[0xD0, 0xFE]), "BNE $0400");
        assert_eq!(format(0x0400, &[0x80, 0x10]), "BRA $0412");
        assert_eq!(format(0x0400, &[0x82, 0xFE]), "RER $0500");
    }

    #[test]
    fn test_format_data_byte() {
        let instr = Instruction {
            address: 0x2000,
            opcode: 0xFF,
            mnemonic: ".byte",
            addressing_mode: AddressingMode::Implied,
            operand_bytes: vec![0xFF],
            size_bytes: 1,
            base_cycles: 0,
        };

        assert_eq!(format_instruction(&instr), ".byte $FF");
    }
}
