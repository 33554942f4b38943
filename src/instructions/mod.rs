//! # 65el02 Instruction Implementations
//!
//! This module contains the implementations of all 65el02 instructions,
//! organized by category. Each handler takes the CPU after fetch and
//! effective-address resolution; operands come from `cpu.operand()` or from
//! `cpu.ea`.
//!
//! ## Categories
//!
//! - **alu**: ORA, AND, EOR, ADC, SBC, CMP, CPX, CPY, BIT, TSB, TRB, MUL, DIV
//! - **branches**: BPL, BMI, BVC, BVS, BCC, BCS, BNE, BEQ, BRA
//! - **shifts**: ASL, LSR, ROL, ROR
//! - **load_store**: LDA, LDX, LDY, STA, STX, STY, STZ
//! - **inc_dec**: INC, DEC, INX, INY, DEX, DEY
//! - **control**: JMP, JSR, RTS, RTI, BRK, NOP, STP, WAI
//! - **stack**: system and register stack pushes and pulls
//! - **flags**: flag set/clear, REP, SEP, XCE
//! - **transfer**: register transfers, including R and I
//! - **extended**: threaded-code (ENT/NXT/NXA), D register, XBA and MMU

pub mod alu;
pub mod branches;
pub mod control;
pub mod extended;
pub mod flags;
pub mod inc_dec;
pub mod load_store;
pub mod shifts;
pub mod stack;
pub mod transfer;

use crate::opcodes::TRAP_OPCODE;
use crate::{ExecutionError, MemoryBus, CPU, OPCODE_TABLE};

/// Executes the fetched instruction `opcode`.
///
/// The trap opcode sets `op_trap` and does nothing else. In classic mode,
/// opcodes outside the NMOS instruction set are no-ops.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), ExecutionError> {
    if opcode == TRAP_OPCODE {
        cpu.state.op_trap = true;
        log::warn!(
            "illegal opcode 0x{:02X} at 0x{:04X}",
            opcode,
            cpu.state.last_pc
        );
        return Ok(());
    }
    if cpu.config.classic_mode && !OPCODE_TABLE[opcode as usize].nmos {
        return Ok(());
    }

    cpu.ea = cpu.resolve_effective_address()?;

    match opcode {
        // ========== ALU ==========
        0x01 | 0x03 | 0x05 | 0x07 | 0x09 | 0x0D | 0x11 | 0x12 | 0x13 | 0x15 | 0x17 | 0x19
        | 0x1D => alu::execute_ora(cpu),
        0x21 | 0x23 | 0x25 | 0x27 | 0x29 | 0x2D | 0x31 | 0x32 | 0x33 | 0x35 | 0x37 | 0x39
        | 0x3D => alu::execute_and(cpu),
        0x41 | 0x43 | 0x45 | 0x47 | 0x49 | 0x4D | 0x51 | 0x52 | 0x53 | 0x55 | 0x57 | 0x59
        | 0x5D => alu::execute_eor(cpu),
        0x61 | 0x63 | 0x65 | 0x67 | 0x69 | 0x6D | 0x71 | 0x72 | 0x73 | 0x75 | 0x77 | 0x79
        | 0x7D => alu::execute_adc(cpu),
        0xC1 | 0xC3 | 0xC5 | 0xC7 | 0xC9 | 0xCD | 0xD1 | 0xD2 | 0xD3 | 0xD5 | 0xD7 | 0xD9
        | 0xDD => alu::execute_cmp(cpu),
        0xE1 | 0xE3 | 0xE5 | 0xE7 | 0xE9 | 0xED | 0xF1 | 0xF2 | 0xF3 | 0xF5 | 0xF7 | 0xF9
        | 0xFD => alu::execute_sbc(cpu),
        0xE0 | 0xE4 | 0xEC => alu::execute_cpx(cpu),
        0xC0 | 0xC4 | 0xCC => alu::execute_cpy(cpu),
        0x24 | 0x2C | 0x34 | 0x3C | 0x89 => alu::execute_bit(cpu, opcode),
        0x04 | 0x0C => alu::execute_tsb(cpu),
        0x14 | 0x1C => alu::execute_trb(cpu),
        0x0F | 0x1F | 0x2F | 0x3F => alu::execute_mul(cpu),
        0x4F | 0x5F | 0x6F | 0x7F => alu::execute_div(cpu),

        // ========== Shifts ==========
        0x06 | 0x0A | 0x0E | 0x16 | 0x1E => shifts::execute_asl(cpu, opcode),
        0x46 | 0x4A | 0x4E | 0x56 | 0x5E => shifts::execute_lsr(cpu, opcode),
        0x26 | 0x2A | 0x2E | 0x36 | 0x3E => shifts::execute_rol(cpu, opcode),
        0x66 | 0x6A | 0x6E | 0x76 | 0x7E => shifts::execute_ror(cpu, opcode),

        // ========== Increment / Decrement ==========
        0x1A | 0xE6 | 0xEE | 0xF6 | 0xFE => inc_dec::execute_inc(cpu, opcode),
        0x3A | 0xC6 | 0xCE | 0xD6 | 0xDE => inc_dec::execute_dec(cpu, opcode),
        0xE8 => inc_dec::execute_inx(cpu),
        0xC8 => inc_dec::execute_iny(cpu),
        0xCA => inc_dec::execute_dex(cpu),
        0x88 => inc_dec::execute_dey(cpu),

        // ========== Load / Store ==========
        0xA1 | 0xA3 | 0xA5 | 0xA7 | 0xA9 | 0xAD | 0xB1 | 0xB2 | 0xB3 | 0xB5 | 0xB7 | 0xB9
        | 0xBD => load_store::execute_lda(cpu),
        0xA2 | 0xA6 | 0xAE | 0xB6 | 0xBE => load_store::execute_ldx(cpu),
        0xA0 | 0xA4 | 0xAC | 0xB4 | 0xBC => load_store::execute_ldy(cpu),
        0x81 | 0x83 | 0x85 | 0x87 | 0x8D | 0x91 | 0x92 | 0x93 | 0x95 | 0x97 | 0x99 | 0x9D => {
            load_store::execute_sta(cpu)
        }
        0x86 | 0x8E | 0x96 => load_store::execute_stx(cpu),
        0x84 | 0x8C | 0x94 => load_store::execute_sty(cpu),
        0x64 | 0x74 | 0x9C | 0x9E => load_store::execute_stz(cpu),

        // ========== Transfers ==========
        0xAA => transfer::execute_tax(cpu),
        0xA8 => transfer::execute_tay(cpu),
        0x8A => transfer::execute_txa(cpu),
        0x98 => transfer::execute_tya(cpu),
        0x9B => transfer::execute_txy(cpu),
        0xBB => transfer::execute_tyx(cpu),
        0xBA => transfer::execute_tsx(cpu),
        0x9A => transfer::execute_txs(cpu),
        0x8B => transfer::execute_txr(cpu),
        0xAB => transfer::execute_trx(cpu),
        0x5C => transfer::execute_txi(cpu),
        0xDC => transfer::execute_tix(cpu),

        // ========== System Stack ==========
        0x48 => stack::execute_pha(cpu),
        0x68 => stack::execute_pla(cpu),
        0xDA => stack::execute_phx(cpu),
        0xFA => stack::execute_plx(cpu),
        0x5A => stack::execute_phy(cpu),
        0x7A => stack::execute_ply(cpu),
        0x08 => stack::execute_php(cpu),
        0x28 => stack::execute_plp(cpu),
        0xDF => stack::execute_phd(cpu),
        0xCF => stack::execute_pld(cpu),
        0xF4 => stack::execute_pea(cpu),
        0xD4 => stack::execute_pei(cpu),
        0x62 => stack::execute_per(cpu),

        // ========== Register Stack ==========
        0x4B => stack::execute_rha(cpu),
        0x6B => stack::execute_rla(cpu),
        0x1B => stack::execute_rhx(cpu),
        0x3B => stack::execute_rlx(cpu),
        0x5B => stack::execute_rhy(cpu),
        0x7B => stack::execute_rly(cpu),
        0x0B => stack::execute_rhi(cpu),
        0x2B => stack::execute_rli(cpu),
        0x82 => stack::execute_rer(cpu),
        0x44 => stack::execute_rea(cpu),
        0x54 => stack::execute_rei(cpu),

        // ========== Control Flow ==========
        0x10 | 0x30 | 0x50 | 0x70 | 0x80 | 0x90 | 0xB0 | 0xD0 | 0xF0 => {
            branches::execute_branch(cpu, opcode)
        }
        0x4C | 0x6C | 0x7C => control::execute_jmp(cpu, opcode),
        0x20 | 0xFC => control::execute_jsr(cpu, opcode),
        0x60 => control::execute_rts(cpu),
        0x40 => control::execute_rti(cpu),
        0x00 => control::execute_brk(cpu),
        0xEA => Ok(()),
        0xDB => control::execute_stp(cpu),
        0xCB => control::execute_wai(cpu),

        // ========== Flags ==========
        0x18 | 0x38 | 0x58 | 0x78 | 0xB8 | 0xD8 | 0xF8 => flags::execute_flag(cpu, opcode),
        0xC2 => flags::execute_rep(cpu),
        0xE2 => flags::execute_sep(cpu),
        0xFB => flags::execute_xce(cpu),

        // ========== 65el02 Extensions ==========
        0x22 => extended::execute_ent(cpu),
        0x02 => extended::execute_nxt(cpu),
        0x42 => extended::execute_nxa(cpu),
        0x8F => extended::execute_zea(cpu),
        0x9F => extended::execute_sea(cpu),
        0xAF => extended::execute_tda(cpu),
        0xBF => extended::execute_tad(cpu),
        0xEB => extended::execute_xba(cpu),
        0xEF => extended::execute_mmu(cpu),

        // Every remaining byte is the trap opcode, handled above
        _ => Ok(()),
    }
}

// ========== Shared Helpers ==========

/// Loads A, masked to the accumulator width, and sets Z and N.
pub(crate) fn set_accumulator<M: MemoryBus>(cpu: &mut CPU<M>, value: u16) {
    let value = value & cpu.state.mask_m();
    cpu.state.a = value;
    crate::alu::set_arithmetic_flags(&mut cpu.state, value, false);
}

/// Loads X, masked to the index width, and sets Z and N.
pub(crate) fn set_x<M: MemoryBus>(cpu: &mut CPU<M>, value: u16) {
    let value = value & cpu.state.mask_x();
    cpu.state.x = value;
    crate::alu::set_arithmetic_flags(&mut cpu.state, value, true);
}

/// Loads Y, masked to the index width, and sets Z and N.
pub(crate) fn set_y<M: MemoryBus>(cpu: &mut CPU<M>, value: u16) {
    let value = value & cpu.state.mask_x();
    cpu.state.y = value;
    crate::alu::set_arithmetic_flags(&mut cpu.state, value, true);
}
