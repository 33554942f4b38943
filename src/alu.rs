//! # Arithmetic Logic Unit
//!
//! Flag-accurate arithmetic shared by every addressing-mode variant of an
//! instruction. All functions operate on a [`CpuState`] and honour the current
//! accumulator width (`m_width`): 8-bit operations mask to `0xFF` and take the
//! sign from bit 7, 16-bit operations mask to `0xFFFF` and use bit 15.
//!
//! Index-register comparisons (CPX/CPY) use the index width instead; callers
//! select it with the `index` argument.

use crate::state::CpuState;

/// Sets Z and N from a register value of the chosen width class.
///
/// `index` selects the X/Y width, otherwise the accumulator width is used.
pub fn set_arithmetic_flags(state: &mut CpuState, value: u16, index: bool) {
    state.zero = value == 0;
    state.negative = value & state.negative_bit(index) != 0;
}

/// Binary add with carry.
///
/// C is the carry out of the top bit; V is C XOR the carry out of bit 6
/// (8-bit) or bit 14 (16-bit).
///
/// # Examples
///
/// ```
/// use lib65el02::{alu, CpuState};
///
/// let mut state = CpuState::new();
/// let result = alu::adc(&mut state, 0x7F, 0x01);
/// assert_eq!(result, 0x80);
/// assert!(state.overflow);
/// assert!(state.negative);
/// assert!(!state.carry);
/// ```
pub fn adc(state: &mut CpuState, acc: u16, operand: u16) -> u16 {
    let neg = u32::from(state.negative_m());
    let mask = u32::from(state.mask_m());
    let carry_in = u32::from(state.carry);
    let acc = u32::from(acc);
    let operand = u32::from(operand);

    let result = (operand & mask) + (acc & mask) + carry_in;
    let below_sign = (operand & (neg - 1)) + (acc & (neg - 1)) + carry_in;

    state.carry = result & (mask + 1) != 0;
    state.overflow = state.carry ^ (below_sign & neg != 0);

    let result = (result & mask) as u16;
    set_arithmetic_flags(state, result, false);
    result
}

/// Binary subtract with borrow, computed as `adc(acc, !operand)`.
pub fn sbc(state: &mut CpuState, acc: u16, operand: u16) -> u16 {
    adc(state, acc, !operand)
}

/// Number of BCD digits held by the accumulator at its current width.
fn bcd_digits(state: &CpuState) -> u32 {
    if state.m_width {
        2
    } else {
        4
    }
}

/// BCD add with carry.
///
/// Digits are added from least significant upwards, each corrected by +6
/// when it exceeds 9. V is always cleared. N follows the sign bit of the
/// result, except in classic (NMOS) mode where BCD results are never
/// negative.
pub fn adc_decimal(state: &mut CpuState, acc: u16, operand: u16, classic: bool) -> u16 {
    let mut carry = u16::from(state.carry);
    let mut result = 0u16;

    for digit in 0..bcd_digits(state) {
        let shift = digit * 4;
        let mut sum = ((acc >> shift) & 0xF) + ((operand >> shift) & 0xF) + carry;
        if sum > 9 {
            sum += 6;
        }
        carry = u16::from(sum > 15);
        result |= (sum & 0xF) << shift;
    }

    result &= state.mask_m();
    state.carry = carry != 0;
    state.zero = result == 0;
    state.overflow = false;
    state.negative = !classic && result & state.negative_m() != 0;
    result
}

/// BCD subtract with borrow.
///
/// A digit that goes negative borrows from the next and is corrected by −6.
/// C is set when no borrow leaves the top digit. V is always cleared.
pub fn sbc_decimal(state: &mut CpuState, acc: u16, operand: u16) -> u16 {
    let mut borrow = i32::from(!state.carry);
    let mut result = 0u16;

    for digit in 0..bcd_digits(state) {
        let shift = digit * 4;
        let mut diff = i32::from((acc >> shift) & 0xF) - i32::from((operand >> shift) & 0xF) - borrow;
        if diff < 0 {
            diff -= 6;
            borrow = 1;
        } else {
            borrow = 0;
        }
        result |= ((diff & 0xF) as u16) << shift;
    }

    result &= state.mask_m();
    state.carry = borrow == 0;
    state.zero = result == 0;
    state.overflow = false;
    state.negative = result & state.negative_m() != 0;
    result
}

/// Compare a register with an operand.
///
/// C is set when `reg >= operand`; Z and N come from the difference masked to
/// the chosen width.
pub fn cmp(state: &mut CpuState, reg: u16, operand: u16, index: bool) {
    let diff = reg.wrapping_sub(operand) & state.mask(index);
    state.carry = reg >= operand;
    state.zero = diff == 0;
    state.negative = diff & state.negative_bit(index) != 0;
}

// ========== Shifts and Rotates ==========
//
// Each returns the shifted value masked to the accumulator width and updates
// C, Z and N.

/// Arithmetic shift left.
pub fn asl(state: &mut CpuState, value: u16) -> u16 {
    state.carry = value & state.negative_m() != 0;
    let result = (value << 1) & state.mask_m();
    set_arithmetic_flags(state, result, false);
    result
}

/// Logical shift right.
pub fn lsr(state: &mut CpuState, value: u16) -> u16 {
    state.carry = value & 0x01 != 0;
    let result = (value & state.mask_m()) >> 1;
    set_arithmetic_flags(state, result, false);
    result
}

/// Rotate left through carry.
pub fn rol(state: &mut CpuState, value: u16) -> u16 {
    let result = ((value << 1) | u16::from(state.carry)) & state.mask_m();
    state.carry = value & state.negative_m() != 0;
    set_arithmetic_flags(state, result, false);
    result
}

/// Rotate right through carry.
pub fn ror(state: &mut CpuState, value: u16) -> u16 {
    let carry_in = if state.carry { state.negative_m() } else { 0 };
    let result = ((value & state.mask_m()) >> 1) | carry_in;
    state.carry = value & 0x01 != 0;
    set_arithmetic_flags(state, result, false);
    result
}

// ========== Multiply / Divide ==========

fn width_bits(state: &CpuState) -> u32 {
    if state.m_width {
        8
    } else {
        16
    }
}

/// Sign-extends a value of the current accumulator width.
fn sign_extend(state: &CpuState, value: u16) -> i64 {
    if state.m_width {
        i64::from(value as u8 as i8)
    } else {
        i64::from(value as i16)
    }
}

/// Multiply A by the operand into D:A.
///
/// With carry set the multiply is signed. The low half of the product lands
/// in A and the high half in D. V is set when D holds more than a sign
/// extension of A.
///
/// # Examples
///
/// ```
/// use lib65el02::{alu, CpuState};
///
/// let mut state = CpuState::new();
/// state.a = 0x10;
/// alu::mul(&mut state, 0x20);
/// assert_eq!(state.a, 0x00);
/// assert_eq!(state.d, 0x02);
/// assert!(state.overflow);
/// ```
pub fn mul(state: &mut CpuState, operand: u16) {
    let mask = state.mask_m();
    let product = if state.carry {
        sign_extend(state, operand) * sign_extend(state, state.a)
    } else {
        i64::from(operand & mask) * i64::from(state.a & mask)
    };

    state.a = (product & i64::from(mask)) as u16;
    state.d = ((product >> width_bits(state)) & i64::from(mask)) as u16;
    state.negative = product < 0;
    state.zero = product == 0;
    state.overflow = state.d != 0 && state.d != mask;
}

/// Divide D:A by the operand; quotient to A, remainder to D.
///
/// With carry set the division is signed and truncates toward zero. Division
/// by zero clears A and D, sets V and clears Z and N. Otherwise V reports a
/// quotient that does not fit the accumulator width.
pub fn div(state: &mut CpuState, operand: u16) {
    let mask = state.mask_m();
    let bits = width_bits(state);

    if operand & mask == 0 {
        state.a = 0;
        state.d = 0;
        state.overflow = true;
        state.zero = false;
        state.negative = false;
        return;
    }

    let (dividend, divisor) = if state.carry {
        (
            (sign_extend(state, state.d) << bits) | i64::from(state.a & mask),
            sign_extend(state, operand),
        )
    } else {
        (
            (i64::from(state.d & mask) << bits) | i64::from(state.a & mask),
            i64::from(operand & mask),
        )
    };

    let quotient = dividend / divisor;
    let remainder = dividend % divisor;

    state.d = (remainder & i64::from(mask)) as u16;
    state.a = (quotient & i64::from(mask)) as u16;

    let neg = i64::from(state.negative_m());
    state.overflow = if state.carry {
        quotient > neg - 1 || quotient < -neg
    } else {
        quotient > i64::from(mask)
    };
    state.zero = state.a == 0;
    state.negative = quotient < 0;
}
