//! # Stack Engine
//!
//! The 65el02 has two hardware stacks that share one implementation:
//!
//! - the **system stack** (`S`), used by JSR/RTS, interrupts and the
//!   PHx/PLx family; top `0x0200` by default
//! - the **register stack** (`R`), used by ENT and the RHx/RLx family; top
//!   `0x0300` by default
//!
//! Both grow downward. In emulation mode a stack is confined to the 256
//! bytes below its top and wraps within that page; in native mode it may
//! use the whole address space.
//!
//! ## Push ordering
//!
//! `CpuConfig::stack_bug` selects between the two orderings found in the
//! wild. When set (the default) a push moves the pointer and then writes,
//! so the pointer always addresses the most recent item. When clear a push
//! writes at the pointer and then moves it.
//!
//! Words are pushed high byte first, so they sit little-endian in memory.

use crate::{ExecutionError, MemoryBus, CPU};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackKind {
    System,
    Register,
}

impl<M: MemoryBus> CPU<M> {
    // ========== Shared Engine ==========

    fn stack_pointer(&self, kind: StackKind) -> u16 {
        match kind {
            StackKind::System => self.state.sp,
            StackKind::Register => self.state.r,
        }
    }

    fn set_stack_pointer(&mut self, kind: StackKind, value: u16) {
        match kind {
            StackKind::System => self.state.sp = value,
            StackKind::Register => self.state.r = value,
        }
    }

    fn stack_top(&self, kind: StackKind) -> u16 {
        match kind {
            StackKind::System => self.config.system_stack_top,
            StackKind::Register => self.config.register_stack_top,
        }
    }

    fn stack_bottom(&self, kind: StackKind) -> u16 {
        if self.state.emulation {
            self.stack_top(kind).wrapping_sub(0x100)
        } else {
            0
        }
    }

    /// Pointer value a stack is reset to.
    pub(crate) fn stack_reset_value(&self, top: u16) -> u16 {
        if self.config.stack_bug {
            top
        } else {
            top.wrapping_sub(1)
        }
    }

    fn push_to(&mut self, kind: StackKind, value: u8) -> Result<(), ExecutionError> {
        if !self.config.stack_bug {
            self.write_byte(self.stack_pointer(kind), value)?;
        }

        let ptr = self.stack_pointer(kind);
        let next = if ptr <= self.stack_bottom(kind) {
            self.stack_top(kind)
        } else {
            ptr - 1
        };
        self.set_stack_pointer(kind, next);

        if self.config.stack_bug {
            self.write_byte(next, value)?;
        }
        Ok(())
    }

    fn pop_from(&mut self, kind: StackKind) -> Result<u8, ExecutionError> {
        let mut value = 0;
        if self.config.stack_bug {
            value = self.read_byte(self.stack_pointer(kind))?;
        }

        let ptr = self.stack_pointer(kind);
        let next = if self.state.emulation && ptr >= self.stack_top(kind) {
            self.stack_bottom(kind)
        } else {
            ptr.wrapping_add(1)
        };
        self.set_stack_pointer(kind, next);

        if !self.config.stack_bug {
            value = self.read_byte(next)?;
        }
        Ok(value)
    }

    fn push_word_to(&mut self, kind: StackKind, value: u16) -> Result<(), ExecutionError> {
        let [lo, hi] = value.to_le_bytes();
        self.push_to(kind, hi)?;
        self.push_to(kind, lo)
    }

    fn pop_word_from(&mut self, kind: StackKind) -> Result<u16, ExecutionError> {
        let lo = self.pop_from(kind)?;
        let hi = self.pop_from(kind)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    // ========== System Stack ==========

    pub fn push_byte(&mut self, value: u8) -> Result<(), ExecutionError> {
        self.push_to(StackKind::System, value)
    }

    pub fn pop_byte(&mut self) -> Result<u8, ExecutionError> {
        self.pop_from(StackKind::System)
    }

    pub fn push_word(&mut self, value: u16) -> Result<(), ExecutionError> {
        self.push_word_to(StackKind::System, value)
    }

    pub fn pop_word(&mut self) -> Result<u16, ExecutionError> {
        self.pop_word_from(StackKind::System)
    }

    /// Pushes `value` as a word when the selected register class is 16 bits
    /// wide, otherwise as a byte.
    ///
    /// `index` selects the X/Y width instead of the accumulator width.
    ///
    /// # Examples
    ///
    /// ```
    /// use lib65el02::{CpuConfig, FlatMemory, CPU};
    ///
    /// let mut cpu = CPU::new(FlatMemory::new(), CpuConfig::default());
    /// cpu.push(0x1234, false).unwrap();
    /// // Emulation mode: only the low byte goes on the stack
    /// assert_eq!(cpu.sp(), 0x01FF);
    /// assert_eq!(cpu.pop(false).unwrap(), 0x34);
    /// assert_eq!(cpu.sp(), 0x0200);
    /// ```
    pub fn push(&mut self, value: u16, index: bool) -> Result<(), ExecutionError> {
        if self.state.is_wide(index) {
            self.push_word(value)
        } else {
            self.push_byte(value as u8)
        }
    }

    /// Pops a word or a byte depending on the selected width.
    pub fn pop(&mut self, index: bool) -> Result<u16, ExecutionError> {
        if self.state.is_wide(index) {
            self.pop_word()
        } else {
            self.pop_byte().map(u16::from)
        }
    }

    // ========== Register Stack ==========

    pub fn r_push_byte(&mut self, value: u8) -> Result<(), ExecutionError> {
        self.push_to(StackKind::Register, value)
    }

    pub fn r_pop_byte(&mut self) -> Result<u8, ExecutionError> {
        self.pop_from(StackKind::Register)
    }

    pub fn r_push_word(&mut self, value: u16) -> Result<(), ExecutionError> {
        self.push_word_to(StackKind::Register, value)
    }

    pub fn r_pop_word(&mut self) -> Result<u16, ExecutionError> {
        self.pop_word_from(StackKind::Register)
    }

    pub fn r_push(&mut self, value: u16, index: bool) -> Result<(), ExecutionError> {
        if self.state.is_wide(index) {
            self.r_push_word(value)
        } else {
            self.r_push_byte(value as u8)
        }
    }

    pub fn r_pop(&mut self, index: bool) -> Result<u16, ExecutionError> {
        if self.state.is_wide(index) {
            self.r_pop_word()
        } else {
            self.r_pop_byte().map(u16::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{CpuConfig, FlatMemory, MemoryBus, CPU};

    fn cpu(stack_bug: bool) -> CPU<FlatMemory> {
        CPU::new(
            FlatMemory::new(),
            CpuConfig::default().unthrottled().with_stack_bug(stack_bug),
        )
    }

    #[test]
    fn test_reset_pointers_follow_ordering() {
        assert_eq!(cpu(true).sp(), 0x0200);
        assert_eq!(cpu(true).r(), 0x0300);
        assert_eq!(cpu(false).sp(), 0x01FF);
        assert_eq!(cpu(false).r(), 0x02FF);
    }

    #[test]
    fn test_push_moves_then_writes() {
        let mut cpu = cpu(true);
        cpu.push_byte(0xAB).unwrap();
        assert_eq!(cpu.sp(), 0x01FF);
        assert_eq!(cpu.memory().peek(0x01FF), 0xAB);
        assert_eq!(cpu.pop_byte().unwrap(), 0xAB);
        assert_eq!(cpu.sp(), 0x0200);
    }

    #[test]
    fn test_push_writes_then_moves() {
        let mut cpu = cpu(false);
        cpu.push_byte(0xAB).unwrap();
        assert_eq!(cpu.sp(), 0x01FE);
        assert_eq!(cpu.memory().peek(0x01FF), 0xAB);
        assert_eq!(cpu.pop_byte().unwrap(), 0xAB);
        assert_eq!(cpu.sp(), 0x01FF);
    }

    #[test]
    fn test_word_is_little_endian_in_memory() {
        let mut cpu = cpu(true);
        cpu.push_word(0x1234).unwrap();
        assert_eq!(cpu.sp(), 0x01FE);
        assert_eq!(cpu.memory().peek(0x01FE), 0x34);
        assert_eq!(cpu.memory().peek(0x01FF), 0x12);
        assert_eq!(cpu.pop_word().unwrap(), 0x1234);
    }

    #[test]
    fn test_push_at_bottom_wraps_to_top() {
        let mut cpu = cpu(true);
        cpu.state_mut().sp = 0x0100;
        cpu.push_byte(0x55).unwrap();
        assert_eq!(cpu.sp(), 0x0200);
        assert_eq!(cpu.memory().peek(0x0200), 0x55);
    }

    #[test]
    fn test_pop_at_top_wraps_to_bottom_in_emulation() {
        let mut cpu = cpu(false);
        cpu.state_mut().sp = 0x0200;
        cpu.pop_byte().unwrap();
        assert_eq!(cpu.sp(), 0x0100);
    }

    #[test]
    fn test_register_stack_is_independent() {
        let mut cpu = cpu(true);
        cpu.r_push_word(0xBEEF).unwrap();
        assert_eq!(cpu.r(), 0x02FE);
        assert_eq!(cpu.sp(), 0x0200);
        assert_eq!(cpu.memory().peek(0x02FE), 0xEF);
        assert_eq!(cpu.r_pop_word().unwrap(), 0xBEEF);
        assert_eq!(cpu.r(), 0x0300);
    }

    #[test]
    fn test_width_aware_push_in_native_mode() {
        let mut cpu = cpu(true);
        cpu.state_mut().emulation = false;
        cpu.state_mut().m_width = false;
        cpu.push(0xCAFE, false).unwrap();
        assert_eq!(cpu.sp(), 0x01FE);
        cpu.push(0x1234, true).unwrap();
        assert_eq!(cpu.sp(), 0x01FD);
        assert_eq!(cpu.pop(true).unwrap(), 0x34);
        assert_eq!(cpu.pop(false).unwrap(), 0xCAFE);
    }
}
