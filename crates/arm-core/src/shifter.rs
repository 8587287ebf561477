//! Barrel shifter producing data-processing and addressing operands.

/// Shift opcode encoded in bits 6..5 of register-form operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftKind {
    /// Logical shift left.
    Lsl,
    /// Logical shift right.
    Lsr,
    /// Arithmetic shift right.
    Asr,
    /// Rotate right (`RRX` when the immediate amount is zero).
    Ror,
}

impl ShiftKind {
    /// Decodes the two-bit shift type field.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => Self::Lsl,
            1 => Self::Lsr,
            2 => Self::Asr,
            _ => Self::Ror,
        }
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Lsl => "LSL",
            Self::Lsr => "LSR",
            Self::Asr => "ASR",
            Self::Ror => "ROR",
        }
    }
}

/// Result of one pass through the barrel shifter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShifterOutput {
    /// Shifted operand value.
    pub value: u32,
    /// Shifter carry-out.
    pub carry: bool,
}

impl ShifterOutput {
    const fn new(value: u32, carry: bool) -> Self {
        Self { value, carry }
    }
}

const fn bit(value: u32, index: u32) -> bool {
    (value >> index) & 1 != 0
}

const fn sign_fill(value: u32) -> u32 {
    if bit(value, 31) {
        u32::MAX
    } else {
        0
    }
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
const fn asr(value: u32, amount: u32) -> u32 {
    ((value as i32) >> amount) as u32
}

/// Shifts `value` by a 5-bit immediate amount.
///
/// A zero amount has per-kind meaning: `LSL #0` passes the value through,
/// `LSR #0` and `ASR #0` encode a shift of 32, and `ROR #0` encodes `RRX`.
#[must_use]
pub const fn shift_by_immediate(
    kind: ShiftKind,
    value: u32,
    amount: u32,
    carry_in: bool,
) -> ShifterOutput {
    let amount = amount & 0x1F;
    if amount != 0 {
        return shift_by_register(kind, value, amount, carry_in);
    }
    match kind {
        ShiftKind::Lsl => ShifterOutput::new(value, carry_in),
        ShiftKind::Lsr => ShifterOutput::new(0, bit(value, 31)),
        ShiftKind::Asr => ShifterOutput::new(sign_fill(value), bit(value, 31)),
        ShiftKind::Ror => {
            let carry_bit = if carry_in { 0x8000_0000 } else { 0 };
            ShifterOutput::new(carry_bit | (value >> 1), bit(value, 0))
        }
    }
}

/// Shifts `value` by an amount taken from the low byte of a register.
///
/// Amounts of 32 and above saturate per kind rather than wrapping.
#[must_use]
pub const fn shift_by_register(
    kind: ShiftKind,
    value: u32,
    amount: u32,
    carry_in: bool,
) -> ShifterOutput {
    let amount = amount & 0xFF;
    if amount == 0 {
        return ShifterOutput::new(value, carry_in);
    }
    match kind {
        ShiftKind::Lsl => match amount {
            1..=31 => ShifterOutput::new(value << amount, bit(value, 32 - amount)),
            32 => ShifterOutput::new(0, bit(value, 0)),
            _ => ShifterOutput::new(0, false),
        },
        ShiftKind::Lsr => match amount {
            1..=31 => ShifterOutput::new(value >> amount, bit(value, amount - 1)),
            32 => ShifterOutput::new(0, bit(value, 31)),
            _ => ShifterOutput::new(0, false),
        },
        ShiftKind::Asr => {
            if amount < 32 {
                ShifterOutput::new(asr(value, amount), bit(value, amount - 1))
            } else {
                ShifterOutput::new(sign_fill(value), bit(value, 31))
            }
        }
        ShiftKind::Ror => {
            let rotate = amount & 0x1F;
            if rotate == 0 {
                ShifterOutput::new(value, bit(value, 31))
            } else {
                ShifterOutput::new(value.rotate_right(rotate), bit(value, rotate - 1))
            }
        }
    }
}

/// Expands an 8-bit immediate rotated right by twice the 4-bit rotate field.
#[must_use]
pub const fn rotated_immediate(imm8: u32, rotate: u32, carry_in: bool) -> ShifterOutput {
    let value = (imm8 & 0xFF).rotate_right((rotate & 0xF) * 2);
    if rotate & 0xF == 0 {
        ShifterOutput::new(value, carry_in)
    } else {
        ShifterOutput::new(value, bit(value, 31))
    }
}

#[cfg(test)]
mod tests {
    use super::{rotated_immediate, shift_by_immediate, shift_by_register, ShiftKind};

    #[test]
    fn immediate_zero_amount_special_cases() {
        let lsl = shift_by_immediate(ShiftKind::Lsl, 0x8000_0001, 0, true);
        assert_eq!((lsl.value, lsl.carry), (0x8000_0001, true));

        let lsr = shift_by_immediate(ShiftKind::Lsr, 0x8000_0000, 0, false);
        assert_eq!((lsr.value, lsr.carry), (0, true));

        let asr = shift_by_immediate(ShiftKind::Asr, 0x8000_0000, 0, false);
        assert_eq!((asr.value, asr.carry), (u32::MAX, true));

        let rrx = shift_by_immediate(ShiftKind::Ror, 0x0000_0003, 0, true);
        assert_eq!((rrx.value, rrx.carry), (0x8000_0001, true));
    }

    #[test]
    fn immediate_nonzero_amounts() {
        let lsl = shift_by_immediate(ShiftKind::Lsl, 0x4000_0001, 2, false);
        assert_eq!((lsl.value, lsl.carry), (0x0000_0004, true));

        let asr = shift_by_immediate(ShiftKind::Asr, 0xF000_0010, 4, false);
        assert_eq!((asr.value, asr.carry), (0xFF00_0001, false));

        let ror = shift_by_immediate(ShiftKind::Ror, 0x0000_00F1, 4, false);
        assert_eq!((ror.value, ror.carry), (0x1000_000F, false));
    }

    #[test]
    fn register_amount_zero_passes_through_for_every_kind() {
        for bits in 0..4 {
            let kind = ShiftKind::from_bits(bits);
            let out = shift_by_register(kind, 0x1234_5678, 0x100, true);
            assert_eq!((out.value, out.carry), (0x1234_5678, true), "{}", kind.mnemonic());
        }
    }

    #[test]
    fn register_amount_thirty_two_and_beyond() {
        let v = 0x8000_0001;
        let at = |kind, amount| {
            let out = shift_by_register(kind, v, amount, false);
            (out.value, out.carry)
        };
        assert_eq!(at(ShiftKind::Lsl, 32), (0, true));
        assert_eq!(at(ShiftKind::Lsl, 33), (0, false));
        assert_eq!(at(ShiftKind::Lsr, 32), (0, true));
        assert_eq!(at(ShiftKind::Lsr, 40), (0, false));
        assert_eq!(at(ShiftKind::Asr, 32), (u32::MAX, true));
        assert_eq!(at(ShiftKind::Asr, 200), (u32::MAX, true));
        assert_eq!(at(ShiftKind::Ror, 32), (v, true));
        assert_eq!(at(ShiftKind::Ror, 64), (v, true));
        assert_eq!(at(ShiftKind::Ror, 33), (0xC000_0000, true));
    }

    #[test]
    fn rotated_immediate_carry_depends_on_rotate() {
        let plain = rotated_immediate(0xFF, 0, true);
        assert_eq!((plain.value, plain.carry), (0xFF, true));

        let rotated = rotated_immediate(0x02, 1, false);
        assert_eq!((rotated.value, rotated.carry), (0x8000_0000, true));

        let high = rotated_immediate(0x3F, 4, true);
        assert_eq!((high.value, high.carry), (0x3F00_0000, false));
    }
}
