//! Dispatch tables mapping decode keys to pre-specialized executor entries.
//!
//! Both tables are built once, by classifying a representative word for every
//! key against the ordered patterns in [`crate::encoding`]. Each slot stores
//! the class fields that the key alone determines, so execution only has to
//! extract operands.

use crate::encoding::{
    arm_decode_key, arm_representative, classify_arm, classify_thumb, thumb_decode_key,
    thumb_representative, ArmClass, ThumbClass, ARM_DECODE_KEYS, THUMB_DECODE_KEYS,
};
use crate::shifter::ShiftKind;

/// ARM data-processing opcode (bits 24..21).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum DataOpcode {
    And,
    Eor,
    Sub,
    Rsb,
    Add,
    Adc,
    Sbc,
    Rsc,
    Tst,
    Teq,
    Cmp,
    Cmn,
    Orr,
    Mov,
    Bic,
    Mvn,
}

impl DataOpcode {
    /// Decodes the 4-bit opcode field.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0xF {
            0x0 => Self::And,
            0x1 => Self::Eor,
            0x2 => Self::Sub,
            0x3 => Self::Rsb,
            0x4 => Self::Add,
            0x5 => Self::Adc,
            0x6 => Self::Sbc,
            0x7 => Self::Rsc,
            0x8 => Self::Tst,
            0x9 => Self::Teq,
            0xA => Self::Cmp,
            0xB => Self::Cmn,
            0xC => Self::Orr,
            0xD => Self::Mov,
            0xE => Self::Bic,
            _ => Self::Mvn,
        }
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Eor => "EOR",
            Self::Sub => "SUB",
            Self::Rsb => "RSB",
            Self::Add => "ADD",
            Self::Adc => "ADC",
            Self::Sbc => "SBC",
            Self::Rsc => "RSC",
            Self::Tst => "TST",
            Self::Teq => "TEQ",
            Self::Cmp => "CMP",
            Self::Cmn => "CMN",
            Self::Orr => "ORR",
            Self::Mov => "MOV",
            Self::Bic => "BIC",
            Self::Mvn => "MVN",
        }
    }
}

/// Thumb register-form ALU opcode (bits 9..6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ThumbAluOpcode {
    And,
    Eor,
    Lsl,
    Lsr,
    Asr,
    Adc,
    Sbc,
    Ror,
    Tst,
    Neg,
    Cmp,
    Cmn,
    Orr,
    Mul,
    Bic,
    Mvn,
}

impl ThumbAluOpcode {
    /// Decodes the 4-bit opcode field.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0xF {
            0x0 => Self::And,
            0x1 => Self::Eor,
            0x2 => Self::Lsl,
            0x3 => Self::Lsr,
            0x4 => Self::Asr,
            0x5 => Self::Adc,
            0x6 => Self::Sbc,
            0x7 => Self::Ror,
            0x8 => Self::Tst,
            0x9 => Self::Neg,
            0xA => Self::Cmp,
            0xB => Self::Cmn,
            0xC => Self::Orr,
            0xD => Self::Mul,
            0xE => Self::Bic,
            _ => Self::Mvn,
        }
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Eor => "EOR",
            Self::Lsl => "LSL",
            Self::Lsr => "LSR",
            Self::Asr => "ASR",
            Self::Adc => "ADC",
            Self::Sbc => "SBC",
            Self::Ror => "ROR",
            Self::Tst => "TST",
            Self::Neg => "NEG",
            Self::Cmp => "CMP",
            Self::Cmn => "CMN",
            Self::Orr => "ORR",
            Self::Mul => "MUL",
            Self::Bic => "BIC",
            Self::Mvn => "MVN",
        }
    }

    /// Register-amount shift performed by this opcode, if it is a shift.
    #[must_use]
    pub const fn shift_kind(self) -> Option<ShiftKind> {
        match self {
            Self::Lsl => Some(ShiftKind::Lsl),
            Self::Lsr => Some(ShiftKind::Lsr),
            Self::Asr => Some(ShiftKind::Asr),
            Self::Ror => Some(ShiftKind::Ror),
            _ => None,
        }
    }
}

/// Second operand encoding of an ARM data-processing instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandForm {
    /// Rotated 8-bit immediate.
    Immediate,
    /// `Rm` shifted by a 5-bit immediate.
    ShiftByImmediate,
    /// `Rm` shifted by the low byte of `Rs`.
    ShiftByRegister,
}

/// P/U/B/W/L and offset-kind bits of a single-register transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct TransferForm {
    /// Offset is a (shifted) register rather than a 12-bit immediate.
    pub register_offset: bool,
    /// Offset is applied before the access.
    pub pre_index: bool,
    /// Offset is added rather than subtracted.
    pub add: bool,
    /// Byte rather than word access.
    pub byte: bool,
    /// W bit. Post-indexed forms write back regardless.
    pub write_back: bool,
    /// Load rather than store.
    pub load: bool,
}

impl TransferForm {
    const fn from_word(word: u32) -> Self {
        Self {
            register_offset: word & (1 << 25) != 0,
            pre_index: word & (1 << 24) != 0,
            add: word & (1 << 23) != 0,
            byte: word & (1 << 22) != 0,
            write_back: word & (1 << 21) != 0,
            load: word & (1 << 20) != 0,
        }
    }

    /// Whether the base register receives the updated address.
    #[must_use]
    pub const fn writes_back(self) -> bool {
        self.write_back || !self.pre_index
    }
}

/// One slot of the ARM dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArmEntry {
    /// No class pattern matched this key.
    #[default]
    Unbound,
    /// `B`/`BL`.
    Branch {
        /// L bit.
        link: bool,
    },
    /// `BX`/`BLX` register form.
    BranchExchange {
        /// `BLX` (bits 7..4 = `0011`).
        link: bool,
    },
    /// `MSR` status move.
    MsrRegister {
        /// R bit: target the current SPSR instead of CPSR.
        spsr: bool,
        /// I bit: rotated immediate source.
        immediate: bool,
    },
    /// Data-processing.
    DataProcessing {
        /// Operation.
        opcode: DataOpcode,
        /// S bit.
        set_flags: bool,
        /// Second operand encoding.
        operand: OperandForm,
    },
    /// Single-register load/store.
    LoadStore(TransferForm),
}

/// One slot of the Thumb dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThumbEntry {
    /// No class pattern matched this key.
    #[default]
    Unbound,
    /// PC-relative literal load.
    LiteralLoad,
    /// Two-register ALU operation.
    DataProcessing {
        /// Operation.
        opcode: ThumbAluOpcode,
    },
    /// Shift by 5-bit immediate.
    ShiftByImmediate {
        /// Shift type from bits 12..11.
        kind: ShiftKind,
    },
}

fn specialize_arm(word: u32) -> ArmEntry {
    match classify_arm(word) {
        None => ArmEntry::Unbound,
        Some(ArmClass::Branch) => ArmEntry::Branch {
            link: word & (1 << 24) != 0,
        },
        Some(ArmClass::BranchExchange) => ArmEntry::BranchExchange {
            link: word & (1 << 5) != 0,
        },
        Some(ArmClass::MsrRegister) => ArmEntry::MsrRegister {
            spsr: word & (1 << 22) != 0,
            immediate: word & (1 << 25) != 0,
        },
        Some(ArmClass::DataProcessing) => ArmEntry::DataProcessing {
            opcode: DataOpcode::from_bits(word >> 21),
            set_flags: word & (1 << 20) != 0,
            operand: if word & (1 << 25) != 0 {
                OperandForm::Immediate
            } else if word & (1 << 4) != 0 {
                OperandForm::ShiftByRegister
            } else {
                OperandForm::ShiftByImmediate
            },
        },
        Some(ArmClass::LoadStore) => ArmEntry::LoadStore(TransferForm::from_word(word)),
    }
}

fn specialize_thumb(halfword: u32) -> ThumbEntry {
    match classify_thumb(halfword) {
        None => ThumbEntry::Unbound,
        Some(ThumbClass::LiteralLoad) => ThumbEntry::LiteralLoad,
        Some(ThumbClass::DataProcessing) => ThumbEntry::DataProcessing {
            opcode: ThumbAluOpcode::from_bits(halfword >> 6),
        },
        Some(ThumbClass::ShiftByImmediate) => ThumbEntry::ShiftByImmediate {
            kind: ShiftKind::from_bits(halfword >> 11),
        },
    }
}

/// Immutable 4096-slot ARM dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmDispatchTable {
    entries: Box<[ArmEntry]>,
}

impl Default for ArmDispatchTable {
    fn default() -> Self {
        Self::build()
    }
}

impl ArmDispatchTable {
    /// Classifies every decode key once.
    #[must_use]
    pub fn build() -> Self {
        let entries = (0..ARM_DECODE_KEYS)
            .map(|key| specialize_arm(arm_representative(key)))
            .collect();
        Self { entries }
    }

    /// Entry bound to the decode key of `word`.
    #[must_use]
    pub fn lookup(&self, word: u32) -> ArmEntry {
        self.entries[arm_decode_key(word)]
    }

    /// Number of keys with a bound executor.
    #[must_use]
    pub fn bound_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| **entry != ArmEntry::Unbound)
            .count()
    }
}

/// Immutable 1024-slot Thumb dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbDispatchTable {
    entries: Box<[ThumbEntry]>,
}

impl Default for ThumbDispatchTable {
    fn default() -> Self {
        Self::build()
    }
}

impl ThumbDispatchTable {
    /// Classifies every decode key once.
    #[must_use]
    pub fn build() -> Self {
        let entries = (0..THUMB_DECODE_KEYS)
            .map(|key| specialize_thumb(thumb_representative(key)))
            .collect();
        Self { entries }
    }

    /// Entry bound to the decode key of `halfword`.
    #[must_use]
    pub fn lookup(&self, halfword: u16) -> ThumbEntry {
        self.entries[thumb_decode_key(halfword)]
    }

    /// Number of keys with a bound executor.
    #[must_use]
    pub fn bound_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| **entry != ThumbEntry::Unbound)
            .count()
    }
}
