//! # Processor State
//!
//! The complete architectural state of a 65el02: registers, status flags,
//! transient decode state and the control lines the execution engine polls.
//!
//! Flags are stored as individual booleans and packed into the status byte
//! (`P`) only when pushed to the stack or read back with PLP/RTI/REP/SEP.
//!
//! ## Status byte layout
//!
//! | Bit  | Emulation mode | Native mode   |
//! |------|----------------|---------------|
//! | 0x80 | N              | N             |
//! | 0x40 | V              | V             |
//! | 0x20 | always 1       | M (A width)   |
//! | 0x10 | B (break)      | X (X/Y width) |
//! | 0x08 | D              | D             |
//! | 0x04 | I              | I             |
//! | 0x02 | Z              | Z             |
//! | 0x01 | C              | C             |

/// Carry flag bit.
pub const P_CARRY: u8 = 0x01;
/// Zero flag bit.
pub const P_ZERO: u8 = 0x02;
/// IRQ disable flag bit.
pub const P_IRQ_DISABLE: u8 = 0x04;
/// Decimal mode flag bit.
pub const P_DECIMAL: u8 = 0x08;
/// Break flag (emulation) or index width flag (native).
pub const P_BREAK_OR_X: u8 = 0x10;
/// Accumulator width flag; reads as set in emulation mode.
pub const P_M_FLAG: u8 = 0x20;
/// Overflow flag bit.
pub const P_OVERFLOW: u8 = 0x40;
/// Negative flag bit.
pub const P_NEGATIVE: u8 = 0x80;

/// Default power-on-reset address.
pub const DEFAULT_POR: u16 = 0x0400;
/// Default software interrupt address.
pub const DEFAULT_BRK: u16 = 0x2000;

/// Architectural and control state of the processor.
///
/// All registers are held as `u16`. In 8-bit modes the upper byte of `a`,
/// `x` and `y` is kept clear; the hidden high byte of the accumulator lives
/// in `a_top` (already shifted into bits 8-15).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    /// Accumulator.
    pub a: u16,
    /// Archived accumulator high byte, stored pre-shifted (`0xHH00`).
    pub a_top: u16,
    /// X index register.
    pub x: u16,
    /// Y index register.
    pub y: u16,
    /// System stack pointer (full 16-bit address).
    pub sp: u16,
    /// Program counter.
    pub pc: u16,
    /// Opcode of the instruction being executed.
    pub ir: u8,
    /// 65el02 I register (threaded-code instruction pointer).
    pub i: u16,
    /// 65el02 register stack pointer.
    pub r: u16,
    /// 65el02 D register (MUL/DIV extension).
    pub d: u16,
    /// Software interrupt address, programmable through MMU.
    pub brk: u16,
    /// Power-on-reset address, programmable through MMU.
    pub por: u16,

    pub carry: bool,
    pub zero: bool,
    pub irq_disable: bool,
    pub decimal: bool,
    pub break_flag: bool,
    pub overflow: bool,
    pub negative: bool,
    /// 6502 emulation mode; forces 8-bit widths.
    pub emulation: bool,
    /// Accumulator/memory width: `true` is 8-bit.
    pub m_width: bool,
    /// Index register width: `true` is 8-bit.
    pub index_width: bool,

    /// Length of the current instruction including the opcode.
    pub inst_size: u8,
    /// Operand bytes of the current instruction.
    pub args: [u8; 2],
    /// Lookahead: opcode at the current PC after the last cycle.
    pub next_ir: u8,
    /// Lookahead: operand bytes following `next_ir`.
    pub next_args: [u8; 2],

    pub nmi_asserted: bool,
    pub irq_asserted: bool,
    /// Set by WAI until an interrupt line is asserted.
    pub int_wait: bool,
    /// Set by STP; `cycle()` does nothing while set.
    pub signal_stop: bool,
    /// Set when the last fetched opcode is not part of any instruction set.
    pub op_trap: bool,
    /// Instructions executed since reset.
    pub step_counter: u64,
    /// Nominal clock cycles consumed since reset.
    pub cycles: u64,
    /// Address of the last fetched opcode.
    pub last_pc: u16,
    /// Last address touched on the bus.
    pub last_memory: u16,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            a: 0,
            a_top: 0,
            x: 0,
            y: 0,
            sp: 0,
            pc: 0,
            ir: 0,
            i: 0,
            r: 0,
            d: 0,
            brk: DEFAULT_BRK,
            por: DEFAULT_POR,
            carry: false,
            zero: false,
            irq_disable: false,
            decimal: false,
            break_flag: false,
            overflow: false,
            negative: false,
            emulation: true,
            m_width: true,
            index_width: true,
            inst_size: 0,
            args: [0; 2],
            next_ir: 0,
            next_args: [0; 2],
            nmi_asserted: false,
            irq_asserted: false,
            int_wait: false,
            signal_stop: false,
            op_trap: false,
            step_counter: 0,
            cycles: 0,
            last_pc: 0,
            last_memory: 0,
        }
    }
}

impl CpuState {
    /// Creates a state with power-on defaults (emulation mode, 8-bit widths).
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Width Masks ==========

    /// Value mask for the accumulator/memory width.
    pub fn mask_m(&self) -> u16 {
        if self.m_width {
            0xFF
        } else {
            0xFFFF
        }
    }

    /// Value mask for the index register width.
    pub fn mask_x(&self) -> u16 {
        if self.index_width {
            0xFF
        } else {
            0xFFFF
        }
    }

    /// Sign bit for the accumulator/memory width.
    pub fn negative_m(&self) -> u16 {
        if self.m_width {
            0x80
        } else {
            0x8000
        }
    }

    /// Sign bit for the index register width.
    pub fn negative_x(&self) -> u16 {
        if self.index_width {
            0x80
        } else {
            0x8000
        }
    }

    /// Mask for either the index width (`index == true`) or the m width.
    pub fn mask(&self, index: bool) -> u16 {
        if index {
            self.mask_x()
        } else {
            self.mask_m()
        }
    }

    /// Sign bit for either the index width or the m width.
    pub fn negative_bit(&self, index: bool) -> u16 {
        if index {
            self.negative_x()
        } else {
            self.negative_m()
        }
    }

    /// Returns true when an operand of the given class is 16 bits wide.
    ///
    /// Emulation mode always reports 8-bit operands.
    pub fn is_wide(&self, index: bool) -> bool {
        let narrow = if index { self.index_width } else { self.m_width };
        !self.emulation && !narrow
    }

    // ========== Status Byte ==========

    /// Packs the flags into the status byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use lib65el02::CpuState;
    ///
    /// let mut state = CpuState::new();
    /// state.carry = true;
    /// state.negative = true;
    /// // Bit 5 always reads as set in emulation mode
    /// assert_eq!(state.status(), 0xA1);
    /// ```
    pub fn status(&self) -> u8 {
        let mut p = 0;
        if self.carry {
            p |= P_CARRY;
        }
        if self.zero {
            p |= P_ZERO;
        }
        if self.irq_disable {
            p |= P_IRQ_DISABLE;
        }
        if self.decimal {
            p |= P_DECIMAL;
        }
        let bit4 = if self.emulation {
            self.break_flag
        } else {
            self.index_width
        };
        if bit4 {
            p |= P_BREAK_OR_X;
        }
        if self.emulation || self.m_width {
            p |= P_M_FLAG;
        }
        if self.overflow {
            p |= P_OVERFLOW;
        }
        if self.negative {
            p |= P_NEGATIVE;
        }
        p
    }

    /// Unpacks a status byte into the flags, applying width transitions.
    ///
    /// In native mode, clearing bit 5 widens the accumulator and restores the
    /// archived high byte; setting it narrows the accumulator and archives
    /// the high byte into `a_top`. Setting bit 4 narrows X and Y, discarding
    /// their high bytes. In emulation mode both widths stay 8-bit and bit 4
    /// is the break flag.
    pub fn set_status(&mut self, value: u8) {
        self.carry = value & P_CARRY != 0;
        self.zero = value & P_ZERO != 0;
        self.irq_disable = value & P_IRQ_DISABLE != 0;
        self.decimal = value & P_DECIMAL != 0;

        if self.emulation {
            self.index_width = true;
            self.break_flag = value & P_BREAK_OR_X != 0;
        } else if value & P_BREAK_OR_X != 0 {
            self.index_width = true;
            self.x &= 0xFF;
            self.y &= 0xFF;
        } else {
            self.index_width = false;
        }

        if self.emulation {
            self.m_width = true;
        } else {
            self.set_m_width(value & P_M_FLAG != 0);
        }

        self.overflow = value & P_OVERFLOW != 0;
        self.negative = value & P_NEGATIVE != 0;
    }

    /// Switches the accumulator width, archiving or restoring the high byte.
    pub fn set_m_width(&mut self, narrow: bool) {
        let was_narrow = self.m_width;
        self.m_width = narrow;
        if narrow && !was_narrow {
            self.archive_a_top();
        } else if !narrow && was_narrow {
            self.a = self.a_top | (self.a & 0xFF);
        }
    }

    /// Moves the high byte of A into `a_top` and truncates A to 8 bits.
    pub fn archive_a_top(&mut self) {
        self.a_top = self.a & 0xFF00;
        self.a &= 0xFF;
    }

    // ========== Decode Helpers ==========

    /// Returns the length in bytes of `opcode` under the current widths.
    ///
    /// Immediate-operand opcodes grow by one byte when their register is
    /// 16 bits wide. Opcodes with no table size still occupy one byte.
    pub fn instruction_size(&self, opcode: u8) -> u8 {
        let m = u8::from(self.m_width);
        let x = u8::from(self.index_width);
        match opcode {
            0x09 | 0x29 | 0x49 | 0x69 | 0x89 | 0xA9 | 0xC9 | 0xE9 => 3 - m,
            0xA0 | 0xA2 | 0xC0 | 0xE0 => 3 - x,
            _ => crate::OPCODE_TABLE[opcode as usize].size_bytes.max(1),
        }
    }

    /// Little-endian operand word from the fetched argument bytes.
    pub fn operand_word(&self) -> u16 {
        u16::from_le_bytes(self.args)
    }

    /// Formats the flags as `[N-V-B-D-I-Z-C]`, replacing clear flags with `*`.
    pub fn flag_string(&self) -> String {
        let flags = [
            (self.negative, 'N'),
            (self.overflow, 'V'),
            (self.break_flag, 'B'),
            (self.decimal, 'D'),
            (self.irq_disable, 'I'),
            (self.zero, 'Z'),
            (self.carry, 'C'),
        ];
        let body: Vec<String> = flags
            .iter()
            .map(|&(set, name)| if set { name.to_string() } else { "*".to_string() })
            .collect();
        format!("[{}]", body.join("-"))
    }
}
