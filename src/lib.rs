//! # 65el02 CPU Emulator Core
//!
//! An emulator for the 65el02: a 65C02 superset with 16-bit register modes,
//! a second hardware stack, hardware multiply/divide and an MMU-controlled
//! peripheral window ("RedBus").
//!
//! The crate is organised around a [`CPU`] that executes against any
//! [`MemoryBus`]. A [`Bus`] routes every access to the [`Device`] that owns the
//! address, with the RedBus window taking precedence. [`Machine`] assembles a
//! bus, RAM and CPU into a runnable system with halt-and-dump diagnostics.
//!
//! ## Quick Start
//!
//! ```rust
//! use lib65el02::{CpuConfig, FlatMemory, MemoryBus, CPU};
//!
//! let mut memory = FlatMemory::new();
//! // LDA #$42 ; STA $0200
//! memory.load(0x0400, &[0xA9, 0x42, 0x8D, 0x00, 0x02]);
//!
//! let mut cpu = CPU::new(memory, CpuConfig::default().unthrottled());
//! cpu.step().unwrap();
//! cpu.step().unwrap();
//!
//! assert_eq!(cpu.a(), 0x42);
//! assert_eq!(cpu.memory().peek(0x0200), 0x42);
//! ```
//!
//! ## Modules
//!
//! - `state` - Registers, flags and control lines
//! - `opcodes` / `addressing` - Opcode metadata table and addressing modes
//! - `alu` - Arithmetic and logic operations
//! - `cpu` - Fetch/decode/execute, timing throttle and lookahead
//! - `stack` / `interrupts` - System and register stacks, NMI/IRQ/BRK sequencing
//! - `memory` / `devices` - The CPU's memory seam, the device bus and RedBus
//! - `config` - Clock speed and behaviour switches
//! - `trace` - Per-instruction observers
//! - `disassembler` - Instruction decoding and formatting
//! - `machine` - A runnable system with diagnostics

pub mod addressing;
pub mod alu;
pub mod config;
pub mod cpu;
pub mod devices;
pub mod disassembler;
pub mod interrupts;
pub mod machine;
pub mod memory;
pub mod opcodes;
pub mod stack;
pub mod state;
pub mod trace;

// Internal instruction implementations (not part of public API)
mod instructions;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use addressing::AddressingMode;
pub use config::{ClockSpeed, ConfigError, CpuConfig};
pub use cpu::CPU;
pub use devices::acia::{Acia6551, AciaHandle};
pub use devices::ram::RamDevice;
pub use devices::redbus::{Peripheral, RedBus};
pub use devices::rom::RomDevice;
pub use devices::{Bus, BusAccess, BusError, Device};
pub use disassembler::{disassemble, disassemble_one, format_instruction, Instruction};
pub use interrupts::Interrupt;
pub use machine::{Machine, MachineError};
pub use memory::{FlatMemory, MemoryBus};
pub use opcodes::{OpcodeMetadata, OPCODE_TABLE};
pub use state::CpuState;
pub use trace::{LogTraceSink, TraceEvent, TraceSink};

/// Errors that can stop instruction execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// A bus access faulted.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// An interrupt vector pointed at 0xFFFF.
    #[error("interrupt vector at 0x{vector:04X} is not initialised")]
    InvalidVector {
        /// Address of the vector pair that was read.
        vector: u16,
    },
}
