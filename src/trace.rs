//! # Instruction Tracing
//!
//! An optional observer the execution engine calls once per executed
//! instruction. Install one with [`CPU::set_trace_sink`](crate::CPU::set_trace_sink);
//! without a sink the engine does no tracing work at all.
//!
//! [`LogTraceSink`] forwards every event to the `log` facade at trace level,
//! so the host's logger decides whether the (very verbose) output is kept.

use crate::disassembler::{format_instruction, Instruction};
use crate::state::CpuState;

/// Snapshot of one executed instruction and the registers after it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Address the opcode was fetched from.
    pub address: u16,
    pub opcode: u8,
    /// Operand bytes; only the first `size - 1` are meaningful.
    pub operands: [u8; 2],
    /// Encoded length including the opcode.
    pub size: u8,
    pub a: u16,
    pub x: u16,
    pub y: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u16,
    pub r: u16,
    pub d: u16,
    /// Packed status byte.
    pub status: u8,
    /// Total nominal clock cycles after this instruction.
    pub cycles: u64,
    /// Instructions executed since reset, this one included.
    pub step: u64,
}

impl TraceEvent {
    /// Captures the instruction that just completed in `state`.
    pub fn from_state(state: &CpuState) -> Self {
        Self {
            address: state.last_pc,
            opcode: state.ir,
            operands: state.args,
            size: state.inst_size,
            a: state.a,
            x: state.x,
            y: state.y,
            sp: state.sp,
            pc: state.pc,
            i: state.i,
            r: state.r,
            d: state.d,
            status: state.status(),
            cycles: state.cycles,
            step: state.step_counter,
        }
    }

    /// The decoded instruction.
    pub fn instruction(&self) -> Instruction {
        let count = usize::from(self.size.saturating_sub(1)).min(2);
        Instruction::new(self.address, self.opcode, &self.operands[..count])
    }

    /// Assembly text of the instruction, e.g. `LDA #$42`.
    pub fn disassembly(&self) -> String {
        format_instruction(&self.instruction())
    }
}

/// Receives one event per executed instruction.
pub trait TraceSink: Send {
    fn instruction(&mut self, event: &TraceEvent);
}

/// Trace sink that writes each instruction to `log::trace!`.
///
/// # Examples
///
/// ```
/// use lib65el02::{CpuConfig, FlatMemory, LogTraceSink, CPU};
///
/// let mut memory = FlatMemory::new();
/// memory.load(0x0400, &[0xEA]);
/// let mut cpu = CPU::new(memory, CpuConfig::default().unthrottled());
/// cpu.set_trace_sink(Box::new(LogTraceSink));
/// cpu.step().unwrap();
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn instruction(&mut self, event: &TraceEvent) {
        log::trace!(
            "{:04X}  {:<16} A:{:04X} X:{:04X} Y:{:04X} S:{:04X} R:{:04X} I:{:04X} P:{:02X} CYC:{}",
            event.address,
            event.disassembly(),
            event.a,
            event.x,
            event.y,
            event.sp,
            event.r,
            event.i,
            event.status,
            event.cycles
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_disassembly_uses_recorded_size() {
        let mut state = CpuState::new();
        state.last_pc = 0x0400;
        state.ir = 0xA9;
        state.args = [0x42, 0x99];
        state.inst_size = 2;

        let event = TraceEvent::from_state(&state);
        assert_eq!(event.disassembly(), "LDA #$42");

        state.inst_size = 3;
        let wide = TraceEvent::from_state(&state);
        assert_eq!(wide.disassembly(), "LDA #$9942");
    }
}
