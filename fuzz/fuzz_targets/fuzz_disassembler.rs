//! Fuzz target for the disassembler.
//!
//! Decodes arbitrary bytes under arbitrary register widths and checks that
//! the listing tiles the input exactly and agrees with the CPU's own
//! instruction-size decoder.

#![no_main]

use arbitrary::Arbitrary;
use lib65el02::disassembler::{disassemble, DisassemblyOptions};
use lib65el02::{format_instruction, CpuState};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Listing {
    code: Vec<u8>,
    origin: u16,
    wide_accumulator: bool,
    wide_index: bool,
}

fuzz_target!(|listing: Listing| {
    if listing.code.len() > 0x10000 {
        return;
    }

    let options = DisassemblyOptions {
        start_address: listing.origin,
        wide_accumulator: listing.wide_accumulator,
        wide_index: listing.wide_index,
    };

    // Native-mode state with the same widths, for size cross-checks
    let mut state = CpuState::new();
    state.emulation = false;
    state.m_width = !listing.wide_accumulator;
    state.index_width = !listing.wide_index;

    let mut consumed = 0usize;
    for instr in disassemble(&listing.code, options) {
        assert_eq!(
            instr.address,
            listing.origin.wrapping_add(consumed as u16)
        );
        assert!(!format_instruction(&instr).is_empty());

        if instr.mnemonic == ".byte" {
            assert_eq!(instr.size_bytes, 1);
        } else {
            assert_eq!(instr.size_bytes, state.instruction_size(instr.opcode));
            assert_eq!(instr.operand_bytes.len() + 1, instr.size_bytes as usize);
        }
        consumed += instr.size_bytes as usize;
    }

    assert_eq!(consumed, listing.code.len());
});
