//! Fuzz target for CPU step execution.
//!
//! Builds an arbitrary register file and memory image, then executes a few
//! instructions looking for panics and broken register-width invariants.

#![no_main]

use arbitrary::Arbitrary;
use lib65el02::{CpuConfig, FlatMemory, CPU};
use libfuzzer_sys::fuzz_target;

/// Arbitrary CPU initial state for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    a: u16,
    x: u16,
    y: u16,
    d: u16,
    i: u16,
    status: u8,
    /// Native mode when clear
    emulation: bool,
    classic_mode: bool,
}

/// Memory region for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzMemory {
    /// Bytes at the PC location (a few instructions)
    program: [u8; 12],
    zero_page: [u8; 256],
    /// Both stack pages
    stacks: [u8; 512],
    /// Region at 0x4000 for absolute addressing
    main_memory: [u8; 256],
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    memory: FuzzMemory,
}

fuzz_target!(|input: FuzzInput| {
    let mut memory = FlatMemory::new();
    memory.load(0x0000, &input.memory.zero_page);
    memory.load(0x0100, &input.memory.stacks);
    memory.load(0x0400, &input.memory.program);
    memory.load(0x4000, &input.memory.main_memory);
    // Interrupt vectors point at 0x9000
    memory.load(0xFFFA, &[0x00, 0x90, 0x00, 0x90, 0x00, 0x90]);

    let config = CpuConfig::default()
        .unthrottled()
        .with_classic_mode(input.cpu_state.classic_mode);
    let mut cpu = CPU::new(memory, config);

    {
        let state = cpu.state_mut();
        state.emulation = input.cpu_state.emulation;
        state.set_status(input.cpu_state.status);
        state.a = input.cpu_state.a & state.mask_m();
        state.x = input.cpu_state.x & state.mask_x();
        state.y = input.cpu_state.y & state.mask_x();
        state.d = input.cpu_state.d;
        state.i = input.cpu_state.i;
    }

    // FlatMemory never faults and every vector is valid, so no step may fail
    for _ in 0..4 {
        assert!(cpu.step().is_ok());

        let state = cpu.state();
        if state.emulation {
            assert!(state.m_width && state.index_width);
        }
        assert_eq!(state.a & !state.mask_m(), 0);
        assert_eq!(state.x & !state.mask_x(), 0);
        assert_eq!(state.y & !state.mask_x(), 0);
    }
});
