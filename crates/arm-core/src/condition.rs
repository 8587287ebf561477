//! Condition-code evaluation for the 4-bit ARM condition field.

use crate::state::StatusFlags;

/// Condition mnemonics indexed by their 4-bit encoding.
pub const CONDITION_MNEMONICS: [&str; 16] = [
    "EQ", "NE", "CS", "CC", "MI", "PL", "VS", "VC", "HI", "LS", "GE", "LT", "GT", "LE", "AL", "NV",
];

/// Decides whether an instruction with condition `code` executes under `flags`.
///
/// Only the low four bits of `code` are considered. `0xF` executes
/// unconditionally, matching its reuse as an extension prefix.
#[must_use]
pub const fn evaluate(code: u32, flags: StatusFlags) -> bool {
    let StatusFlags {
        negative: n,
        zero: z,
        carry: c,
        overflow: v,
        ..
    } = flags;
    match code & 0xF {
        0x0 => z,
        0x1 => !z,
        0x2 => c,
        0x3 => !c,
        0x4 => n,
        0x5 => !n,
        0x6 => v,
        0x7 => !v,
        0x8 => c && !z,
        0x9 => !c || z,
        0xA => n == v,
        0xB => n != v,
        0xC => !z && n == v,
        0xD => z || n != v,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate, CONDITION_MNEMONICS};
    use crate::state::StatusFlags;

    fn flags(bits: u32) -> StatusFlags {
        StatusFlags {
            negative: bits & 8 != 0,
            zero: bits & 4 != 0,
            carry: bits & 2 != 0,
            overflow: bits & 1 != 0,
            ..StatusFlags::default()
        }
    }

    #[test]
    fn complementary_pairs_disagree_for_every_flag_combination() {
        for nzcv in 0..16 {
            let f = flags(nzcv);
            for code in (0..14).step_by(2) {
                assert_ne!(
                    evaluate(code, f),
                    evaluate(code + 1, f),
                    "{} vs {} with nzcv={nzcv:04b}",
                    CONDITION_MNEMONICS[code as usize],
                    CONDITION_MNEMONICS[code as usize + 1]
                );
            }
        }
    }

    #[test]
    fn always_and_reserved_execute_unconditionally() {
        for nzcv in 0..16 {
            assert!(evaluate(0xE, flags(nzcv)));
            assert!(evaluate(0xF, flags(nzcv)));
        }
    }

    #[test]
    fn signed_comparisons() {
        // N != V: less than.
        assert!(evaluate(0xB, flags(0b1000)));
        assert!(!evaluate(0xA, flags(0b1000)));
        // Z set: LE but not GT.
        assert!(evaluate(0xD, flags(0b0100)));
        assert!(!evaluate(0xC, flags(0b0100)));
        assert!(evaluate(0xC, flags(0b1001)));
    }

    #[test]
    fn only_low_nibble_selects_condition() {
        assert!(evaluate(0x10, flags(0b0100)));
        assert!(!evaluate(0x10, flags(0)));
    }
}
