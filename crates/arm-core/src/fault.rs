use thiserror::Error;

use crate::state::Mode;

/// Instruction set that was active when an instruction was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InstructionSet {
    /// 32-bit ARM instructions.
    Arm,
    /// 16-bit Thumb instructions.
    Thumb,
}

impl InstructionSet {
    /// Size in bytes of one instruction word.
    #[must_use]
    pub const fn instruction_size(self) -> u32 {
        match self {
            Self::Arm => 4,
            Self::Thumb => 2,
        }
    }

    /// Distance between the executing instruction and the value read from `r15`.
    #[must_use]
    pub const fn pipeline_offset(self) -> u32 {
        match self {
            Self::Arm => 8,
            Self::Thumb => 4,
        }
    }
}

impl std::fmt::Display for InstructionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arm => f.write_str("arm"),
            Self::Thumb => f.write_str("thumb"),
        }
    }
}

/// Fault kinds used by tooling and tests to classify a raised [`Fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultKind {
    /// No dispatch entry covers the instruction.
    Decode,
    /// The instruction class is recognized but the opcode is not built yet.
    Unimplemented,
    /// Word access to an address that is not 4-byte aligned.
    Alignment,
    /// Saved status register accessed in a mode that has none.
    InvalidSavedStatus,
    /// Undefined 5-bit processor mode value.
    InvalidMode,
}

/// Fatal conditions that abort the instruction currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Fault {
    /// Dispatch table slot for this decode key is unbound.
    #[error("no {set} dispatch entry for instruction {word:#010x} at {address:#010x}")]
    Decode {
        /// Instruction set the word was fetched in.
        set: InstructionSet,
        /// Address of the instruction.
        address: u32,
        /// Raw instruction word (zero-extended for Thumb).
        word: u32,
    },
    /// Recognized opcode without an implementation.
    #[error("unimplemented {set} instruction {mnemonic} ({word:#010x}) at {address:#010x}")]
    Unimplemented {
        /// Instruction set the word was fetched in.
        set: InstructionSet,
        /// Mnemonic of the recognized opcode.
        mnemonic: &'static str,
        /// Address of the instruction.
        address: u32,
        /// Raw instruction word (zero-extended for Thumb).
        word: u32,
    },
    /// Word load from a misaligned address.
    #[error("misaligned word access at {address:#010x}")]
    Alignment {
        /// Effective address of the access.
        address: u32,
    },
    /// SPSR read or write while in User or System mode.
    #[error("no saved status register in {mode:?} mode")]
    InvalidSavedStatus {
        /// Mode active at the time of the access.
        mode: Mode,
    },
    /// Mode field written with an undefined encoding.
    #[error("invalid processor mode bits {bits:#04x}")]
    InvalidMode {
        /// Offending 5-bit mode value after forcing bit 4.
        bits: u32,
    },
}

impl Fault {
    /// Returns the classification for this fault.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::Decode { .. } => FaultKind::Decode,
            Self::Unimplemented { .. } => FaultKind::Unimplemented,
            Self::Alignment { .. } => FaultKind::Alignment,
            Self::InvalidSavedStatus { .. } => FaultKind::InvalidSavedStatus,
            Self::InvalidMode { .. } => FaultKind::InvalidMode,
        }
    }

    /// Faults raised by the instruction stream itself rather than by status-register misuse.
    ///
    /// These are the conditions real hardware would route through the
    /// undefined-instruction and data-abort vectors.
    #[must_use]
    pub const fn is_exception_candidate(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::Unimplemented { .. } | Self::Alignment { .. }
        )
    }
}
