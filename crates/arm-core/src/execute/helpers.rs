//! Operand and address helpers shared by the ARM and Thumb executors.

use crate::decoder::TransferForm;
use crate::fault::{Fault, InstructionSet};
use crate::shifter::{shift_by_immediate, ShiftKind};
use crate::state::{ArchitecturalState, REG_PC};

/// Register index from a 4-bit field starting at `shift`.
#[must_use]
pub const fn reg_field(word: u32, shift: u32) -> usize {
    ((word >> shift) & 0xF) as usize
}

/// Register index from a 3-bit Thumb field starting at `shift`.
#[must_use]
pub const fn low_reg_field(word: u32, shift: u32) -> usize {
    ((word >> shift) & 0x7) as usize
}

/// Reads an operand register, adding `pc_extra` when it is `r15`.
///
/// Register-specified shifts see `r15` one fetch further ahead.
#[must_use]
pub const fn read_operand(state: &ArchitecturalState, index: usize, pc_extra: u32) -> u32 {
    let value = state.reg(index);
    if index == REG_PC {
        value.wrapping_add(pc_extra)
    } else {
        value
    }
}

/// Sign-extends the 24-bit branch field and scales it to a byte offset.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub const fn branch_offset(word: u32) -> u32 {
    (((word << 8) as i32) >> 6) as u32
}

/// Effective address of a single-register transfer and the base write-back value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAddress {
    /// Address used for the memory access.
    pub access: u32,
    /// Base plus or minus the offset.
    pub updated_base: u32,
}

/// Computes the addresses of an ARM `LDR`/`STR` from its base and offset fields.
#[must_use]
pub fn transfer_address(
    state: &ArchitecturalState,
    word: u32,
    form: TransferForm,
) -> TransferAddress {
    let offset = if form.register_offset {
        let rm = state.reg(reg_field(word, 0));
        let kind = ShiftKind::from_bits(word >> 5);
        shift_by_immediate(kind, rm, (word >> 7) & 0x1F, state.flags().carry).value
    } else {
        word & 0xFFF
    };
    let base = state.reg(reg_field(word, 16));
    let updated_base = if form.add {
        base.wrapping_add(offset)
    } else {
        base.wrapping_sub(offset)
    };
    TransferAddress {
        access: if form.pre_index { updated_base } else { base },
        updated_base,
    }
}

/// Builds the fault for a recognized opcode that has no executor yet.
#[must_use]
pub const fn unimplemented(
    state: &ArchitecturalState,
    mnemonic: &'static str,
    word: u32,
) -> Fault {
    Fault::Unimplemented {
        set: state.instruction_set(),
        mnemonic,
        address: state.pc(),
        word,
    }
}

/// Builds the fault for an unbound dispatch slot.
#[must_use]
pub const fn unbound(set: InstructionSet, address: u32, word: u32) -> Fault {
    Fault::Decode { set, address, word }
}
