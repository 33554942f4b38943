//! # Addressing Modes
//!
//! The 65el02 understands the 65C02 addressing modes plus four stack-relative
//! forms that index off the system stack pointer (`S`) or the register stack
//! pointer (`R`). The mode recorded in the opcode table drives operand fetching
//! and disassembly; the effective address itself is decoded from the opcode
//! bits by the CPU.

/// 65el02 addressing mode enumeration.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implied, Accumulator
/// - **1 byte**: ZeroPage and its indexed/indirect forms, Relative, the
///   stack-relative forms
/// - **1 or 2 bytes**: Immediate (depends on register width)
/// - **2 bytes**: Absolute and its indexed/indirect forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    ///
    /// Examples: CLC, RTS, XCE
    Implied,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: ASL A, INC A
    Accumulator,

    /// Constant operand, 8 or 16 bits wide.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address in zero page.
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero page address indexed by X, masked by the index width.
    ZeroPageX,

    /// Zero page address indexed by Y, masked by the index width.
    ZeroPageY,

    /// Signed 8-bit offset relative to the address of the next instruction.
    ///
    /// Also used by PER and RER, which push `PC + offset`.
    Relative,

    /// Full 16-bit address.
    Absolute,

    /// 16-bit address indexed by X.
    AbsoluteX,

    /// 16-bit address indexed by Y.
    AbsoluteY,

    /// Indirect jump through a 16-bit pointer: JMP ($1234).
    Indirect,

    /// (zp,X): add X to the zero page operand, then dereference.
    IndexedIndirectX,

    /// (zp),Y: dereference the zero page operand, then add Y.
    IndirectIndexedY,

    /// 65C02 (zp): dereference the zero page operand.
    ZeroPageIndirect,

    /// 65C02 (abs,X): used by JMP and JSR.
    AbsoluteIndexedIndirect,

    /// 65el02 stk,S: operand plus the system stack pointer.
    StackRelative,

    /// 65el02 (stk,S),Y: dereference operand plus S, then add Y.
    StackRelativeIndirectY,

    /// 65el02 r,R: operand plus the register stack pointer.
    RegisterRelative,

    /// 65el02 (r,R),Y: dereference operand plus R, then add Y.
    RegisterRelativeIndirectY,
}

impl AddressingMode {
    /// Number of operand bytes for this mode with 8-bit registers.
    pub fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect
            | AddressingMode::AbsoluteIndexedIndirect => 2,
            _ => 1,
        }
    }
}
