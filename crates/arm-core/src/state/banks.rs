//! Shadow storage for banked registers and saved status registers.

use super::mode::{Bank, Mode};

/// First register index covered by the FIQ and User banks.
pub const BANKED_LOW: usize = 8;
/// First register index covered by every privileged bank.
pub const BANKED_STACK: usize = 13;

/// Per-mode shadow copies of `r8..=r14`.
///
/// Only the bank of the *inactive* modes holds authoritative values; the
/// active mode's values live in the visible register file. Swapping happens
/// exclusively through [`BankedRegisters::store`] and [`BankedRegisters::load`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BankedRegisters {
    user: [u32; 7],
    fiq: [u32; 7],
    stack: [[u32; 2]; 4],
}

const fn stack_slot(bank: Bank) -> Option<usize> {
    match bank {
        Bank::Supervisor => Some(0),
        Bank::Abort => Some(1),
        Bank::Irq => Some(2),
        Bank::Undefined => Some(3),
        Bank::User | Bank::Fiq => None,
    }
}

impl BankedRegisters {
    /// Copies the visible banked registers of `mode` out to storage.
    ///
    /// Non-FIQ privileged modes see the User `r8..=r12`, so those are written
    /// back to the User bank.
    pub fn store(&mut self, mode: Mode, visible: &[u32; 16]) {
        let bank = mode.bank();
        match stack_slot(bank) {
            Some(slot) => {
                self.user[..5].copy_from_slice(&visible[BANKED_LOW..BANKED_STACK]);
                self.stack[slot].copy_from_slice(&visible[BANKED_STACK..15]);
            }
            None if bank == Bank::Fiq => self.fiq.copy_from_slice(&visible[BANKED_LOW..15]),
            None => self.user.copy_from_slice(&visible[BANKED_LOW..15]),
        }
    }

    /// Copies the stored banked registers of `mode` into the visible file.
    pub fn load(&self, mode: Mode, visible: &mut [u32; 16]) {
        let bank = mode.bank();
        match stack_slot(bank) {
            Some(slot) => {
                visible[BANKED_LOW..BANKED_STACK].copy_from_slice(&self.user[..5]);
                visible[BANKED_STACK..15].copy_from_slice(&self.stack[slot]);
            }
            None if bank == Bank::Fiq => visible[BANKED_LOW..15].copy_from_slice(&self.fiq),
            None => visible[BANKED_LOW..15].copy_from_slice(&self.user),
        }
    }
}

/// One saved program status register per exception mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SavedStatusRegisters {
    fiq: u32,
    irq: u32,
    supervisor: u32,
    abort: u32,
    undefined: u32,
}

impl SavedStatusRegisters {
    /// Reads the SPSR owned by `mode`, or `None` for User/System.
    #[must_use]
    pub const fn get(&self, mode: Mode) -> Option<u32> {
        match mode {
            Mode::Fiq => Some(self.fiq),
            Mode::Irq => Some(self.irq),
            Mode::Supervisor => Some(self.supervisor),
            Mode::Abort => Some(self.abort),
            Mode::Undefined => Some(self.undefined),
            Mode::User | Mode::System => None,
        }
    }

    /// Slot of the SPSR owned by `mode`, or `None` for User/System.
    pub fn get_mut(&mut self, mode: Mode) -> Option<&mut u32> {
        match mode {
            Mode::Fiq => Some(&mut self.fiq),
            Mode::Irq => Some(&mut self.irq),
            Mode::Supervisor => Some(&mut self.supervisor),
            Mode::Abort => Some(&mut self.abort),
            Mode::Undefined => Some(&mut self.undefined),
            Mode::User | Mode::System => None,
        }
    }
}
