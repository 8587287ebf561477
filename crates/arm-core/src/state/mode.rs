//! Processor modes and the register bank each one selects.

/// Processor mode encoded in the low five bits of the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u32)]
pub enum Mode {
    /// Unprivileged application mode.
    User = 0x10,
    /// Fast interrupt.
    Fiq = 0x11,
    /// Normal interrupt.
    Irq = 0x12,
    /// Supervisor call.
    Supervisor = 0x13,
    /// Memory abort.
    Abort = 0x17,
    /// Undefined instruction.
    Undefined = 0x1B,
    /// Privileged mode sharing the User register bank.
    #[default]
    System = 0x1F,
}

/// Register bank selected by a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    /// `r8..=r14` shared by User and System.
    User,
    /// `r8..=r14` private to FIQ.
    Fiq,
    /// `r13..=r14` for Supervisor.
    Supervisor,
    /// `r13..=r14` for Abort.
    Abort,
    /// `r13..=r14` for IRQ.
    Irq,
    /// `r13..=r14` for Undefined.
    Undefined,
}

impl Mode {
    /// Every defined mode in encoding order.
    pub const ALL: [Self; 7] = [
        Self::User,
        Self::Fiq,
        Self::Irq,
        Self::Supervisor,
        Self::Abort,
        Self::Undefined,
        Self::System,
    ];

    /// Decodes a mode field. Bit 4 is forced on, so legacy 26-bit encodings
    /// `0x00..=0x03` alias onto their 32-bit counterparts.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match (bits | 0x10) & 0x1F {
            0x10 => Some(Self::User),
            0x11 => Some(Self::Fiq),
            0x12 => Some(Self::Irq),
            0x13 => Some(Self::Supervisor),
            0x17 => Some(Self::Abort),
            0x1B => Some(Self::Undefined),
            0x1F => Some(Self::System),
            _ => None,
        }
    }

    /// Returns the 5-bit encoding.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Everything except User may write the control lanes of CPSR.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        !matches!(self, Self::User)
    }

    /// User and System have no saved status register.
    #[must_use]
    pub const fn has_spsr(self) -> bool {
        !matches!(self, Self::User | Self::System)
    }

    /// Register bank visible in this mode.
    #[must_use]
    pub const fn bank(self) -> Bank {
        match self {
            Self::User | Self::System => Bank::User,
            Self::Fiq => Bank::Fiq,
            Self::Irq => Bank::Irq,
            Self::Supervisor => Bank::Supervisor,
            Self::Abort => Bank::Abort,
            Self::Undefined => Bank::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Bank, Mode};
    use std::collections::HashSet;

    #[test]
    fn encoding_roundtrips_for_every_mode() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_bits(mode.bits()), Some(mode));
        }
    }

    #[test]
    fn legacy_encodings_alias_with_bit_four_forced() {
        assert_eq!(Mode::from_bits(0x00), Some(Mode::User));
        assert_eq!(Mode::from_bits(0x01), Some(Mode::Fiq));
        assert_eq!(Mode::from_bits(0x02), Some(Mode::Irq));
        assert_eq!(Mode::from_bits(0x03), Some(Mode::Supervisor));
    }

    #[test]
    fn undefined_encodings_are_rejected() {
        for bits in [0x14, 0x15, 0x16, 0x18, 0x1A, 0x1C, 0x1E] {
            assert_eq!(Mode::from_bits(bits), None, "{bits:#x}");
        }
    }

    #[test]
    fn user_and_system_share_a_bank_and_lack_spsr() {
        assert_eq!(Mode::User.bank(), Mode::System.bank());
        assert!(!Mode::User.has_spsr());
        assert!(!Mode::System.has_spsr());
        assert!(Mode::System.is_privileged());
        assert!(!Mode::User.is_privileged());
    }

    #[test]
    fn seven_modes_select_six_banks() {
        let banks: HashSet<Bank> = Mode::ALL.iter().map(|m| m.bank()).collect();
        assert_eq!(banks.len(), 6);
        assert_eq!(Mode::Fiq.bank(), Bank::Fiq);
    }
}
