//! Bit-pattern classification of instruction words and decode-key geometry.

/// Number of ARM decode keys (bits 27..20 and 7..4).
pub const ARM_DECODE_KEYS: usize = 4096;
/// Number of Thumb decode keys (bits 15..6).
pub const THUMB_DECODE_KEYS: usize = 1024;

/// A literal/wildcard pattern compiled to a mask and expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitPattern {
    mask: u32,
    value: u32,
}

impl BitPattern {
    /// Compiles a pattern written most-significant bit first.
    ///
    /// Each character is `0`, `1`, or the wildcard `x`; the last character
    /// describes bit 0. Underscores and spaces are ignored.
    ///
    /// # Panics
    ///
    /// Panics on any other character or on more than 32 pattern bits. Patterns
    /// are compiled in `const` items, so this surfaces at build time.
    #[must_use]
    pub const fn compile(pattern: &str) -> Self {
        let bytes = pattern.as_bytes();
        let mut mask = 0u32;
        let mut value = 0u32;
        let mut width = 0;
        let mut index = 0;
        while index < bytes.len() {
            let ch = bytes[index];
            index += 1;
            if ch == b'_' || ch == b' ' {
                continue;
            }
            assert!(width < 32, "bit pattern wider than 32 bits");
            mask <<= 1;
            value <<= 1;
            match ch {
                b'0' => mask |= 1,
                b'1' => {
                    mask |= 1;
                    value |= 1;
                }
                b'x' => {}
                _ => panic!("bit pattern characters must be 0, 1, or x"),
            }
            width += 1;
        }
        Self { mask, value }
    }

    /// Whether every literal bit of the pattern matches `word`.
    #[must_use]
    pub const fn matches(self, word: u32) -> bool {
        word & self.mask == self.value
    }

    /// Bits constrained by the pattern.
    #[must_use]
    pub const fn mask(self) -> u32 {
        self.mask
    }
}

/// ARM instruction classes in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmClass {
    /// `B`/`BL`.
    Branch,
    /// `BX`/`BLX` register form.
    BranchExchange,
    /// `MSR` (immediate or register operand).
    MsrRegister,
    /// Data-processing with immediate or shifted-register operand.
    DataProcessing,
    /// Single-register `LDR`/`STR`/`LDRB`/`STRB`.
    LoadStore,
}

/// Thumb instruction classes in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbClass {
    /// PC-relative `LDR Rd, [PC, #imm]`.
    LiteralLoad,
    /// Two-register ALU operation.
    DataProcessing,
    /// `LSL`/`LSR`/`ASR` by immediate.
    ShiftByImmediate,
}

/// ARM patterns over bits 27..0. First match wins.
pub const ARM_CLASS_PATTERNS: [(ArmClass, BitPattern); 5] = [
    (ArmClass::Branch, BitPattern::compile("101x_xxxx_xxxx_xxxx_xxxx_xxxx_xxxx")),
    (
        ArmClass::BranchExchange,
        BitPattern::compile("0001_0010_xxxx_xxxx_xxxx_00x1_xxxx"),
    ),
    (
        ArmClass::MsrRegister,
        BitPattern::compile("0001_0x10_xxxx_xxxx_xxxx_0000_xxxx"),
    ),
    (
        ArmClass::DataProcessing,
        BitPattern::compile("00xx_xxxx_xxxx_xxxx_xxxx_xxxx_xxxx"),
    ),
    (
        ArmClass::LoadStore,
        BitPattern::compile("01xx_xxxx_xxxx_xxxx_xxxx_xxxx_xxxx"),
    ),
];

/// Thumb patterns over bits 15..0. First match wins.
pub const THUMB_CLASS_PATTERNS: [(ThumbClass, BitPattern); 5] = [
    (ThumbClass::LiteralLoad, BitPattern::compile("0100_1xxx_xxxx_xxxx")),
    (ThumbClass::DataProcessing, BitPattern::compile("0100_00xx_xxxx_xxxx")),
    (ThumbClass::ShiftByImmediate, BitPattern::compile("0000_0xxx_xxxx_xxxx")),
    (ThumbClass::ShiftByImmediate, BitPattern::compile("0000_1xxx_xxxx_xxxx")),
    (ThumbClass::ShiftByImmediate, BitPattern::compile("0001_0xxx_xxxx_xxxx")),
];

/// Extracts the 12-bit ARM decode key from bits 27..20 and 7..4.
#[must_use]
pub const fn arm_decode_key(word: u32) -> usize {
    (((word >> 16) & 0xFF0) | ((word >> 4) & 0xF)) as usize
}

/// Builds a word whose decode key is `key`, with every other bit clear.
#[must_use]
pub const fn arm_representative(key: usize) -> u32 {
    let key = (key & 0xFFF) as u32;
    ((key & 0xFF0) << 16) | ((key & 0xF) << 4)
}

/// Extracts the 10-bit Thumb decode key from bits 15..6.
#[must_use]
pub const fn thumb_decode_key(halfword: u16) -> usize {
    (halfword >> 6) as usize
}

/// Builds a halfword whose decode key is `key`, with bits 5..0 clear.
#[must_use]
pub const fn thumb_representative(key: usize) -> u32 {
    ((key & 0x3FF) as u32) << 6
}

/// Classifies an ARM word by the first matching pattern.
#[must_use]
pub fn classify_arm(word: u32) -> Option<ArmClass> {
    ARM_CLASS_PATTERNS
        .iter()
        .find_map(|(class, pattern)| pattern.matches(word).then_some(*class))
}

/// Classifies a Thumb halfword by the first matching pattern.
#[must_use]
pub fn classify_thumb(halfword: u32) -> Option<ThumbClass> {
    THUMB_CLASS_PATTERNS
        .iter()
        .find_map(|(class, pattern)| pattern.matches(halfword).then_some(*class))
}
