//! ARM-state executors, one per dispatch entry tag.

use super::helpers::{branch_offset, read_operand, reg_field, transfer_address, unimplemented};
use crate::decoder::{ArmEntry, DataOpcode, OperandForm, TransferForm};
use crate::fault::Fault;
use crate::memory::{force_word_alignment, validate_word_alignment, Memory};
use crate::shifter::{
    rotated_immediate, shift_by_immediate, shift_by_register, ShiftKind, ShifterOutput,
};
use crate::state::{field_mask, ArchitecturalState, StatusFlags, PSR_FLAGS_LANE, REG_LR, REG_PC};
use crate::timing::{cycle_cost, CycleCostKind};

/// Runs the executor bound to `entry` for `word`.
///
/// An `Unbound` entry raises [`Fault::Decode`] without touching state.
pub fn execute(
    entry: ArmEntry,
    state: &mut ArchitecturalState,
    memory: &mut dyn Memory,
    word: u32,
) -> Result<u32, Fault> {
    match entry {
        ArmEntry::Unbound => Err(Fault::Decode {
            set: state.instruction_set(),
            address: state.pc(),
            word,
        }),
        ArmEntry::Branch { link } => Ok(branch(state, word, link)),
        ArmEntry::BranchExchange { link } => Ok(branch_exchange(state, word, link)),
        ArmEntry::MsrRegister { spsr, immediate } => status_move(state, word, spsr, immediate),
        ArmEntry::DataProcessing {
            opcode,
            set_flags,
            operand,
        } => data_processing(state, word, opcode, set_flags, operand),
        ArmEntry::LoadStore(form) => single_transfer(state, memory, word, form),
    }
}

fn branch(state: &mut ArchitecturalState, word: u32, link: bool) -> u32 {
    let base = state.reg(REG_PC);
    if link {
        state.set_reg(REG_LR, base.wrapping_sub(4));
    }
    state.set_reg(REG_PC, base.wrapping_add(branch_offset(word)));
    cycle_cost(CycleCostKind::Branch)
}

fn branch_exchange(state: &mut ArchitecturalState, word: u32, link: bool) -> u32 {
    let target = state.reg(reg_field(word, 0));
    if link {
        let return_address = state.reg(REG_PC).wrapping_sub(4);
        state.set_reg(REG_LR, return_address);
    }
    state.flags_mut().thumb = target & 1 != 0;
    state.set_reg(REG_PC, target);
    cycle_cost(CycleCostKind::BranchExchange)
}

fn status_move(
    state: &mut ArchitecturalState,
    word: u32,
    spsr: bool,
    immediate: bool,
) -> Result<u32, Fault> {
    let operand = if immediate {
        rotated_immediate(word & 0xFF, (word >> 8) & 0xF, state.flags().carry).value
    } else {
        state.reg(reg_field(word, 0))
    };
    let mut mask = field_mask(
        word & (1 << 16) != 0,
        word & (1 << 17) != 0,
        word & (1 << 18) != 0,
        word & (1 << 19) != 0,
    );

    if spsr {
        let current = state.spsr()?;
        state.set_spsr((current & !mask) | (operand & mask))?;
    } else {
        if !state.mode().is_privileged() {
            mask &= PSR_FLAGS_LANE;
        }
        state.set_cpsr((state.cpsr() & !mask) | (operand & mask))?;
    }
    Ok(cycle_cost(CycleCostKind::StatusMove))
}

/// Second operand plus the extra read-ahead applied to `r15` operands.
fn shifter_operand(
    state: &ArchitecturalState,
    word: u32,
    form: OperandForm,
) -> (ShifterOutput, u32) {
    let carry = state.flags().carry;
    match form {
        OperandForm::Immediate => (rotated_immediate(word & 0xFF, (word >> 8) & 0xF, carry), 0),
        OperandForm::ShiftByImmediate => {
            let kind = ShiftKind::from_bits(word >> 5);
            let rm = state.reg(reg_field(word, 0));
            (shift_by_immediate(kind, rm, (word >> 7) & 0x1F, carry), 0)
        }
        OperandForm::ShiftByRegister => {
            let kind = ShiftKind::from_bits(word >> 5);
            let rm = read_operand(state, reg_field(word, 0), 4);
            let amount = state.reg(reg_field(word, 8)) & 0xFF;
            (shift_by_register(kind, rm, amount, carry), 4)
        }
    }
}

fn data_processing(
    state: &mut ArchitecturalState,
    word: u32,
    opcode: DataOpcode,
    set_flags: bool,
    form: OperandForm,
) -> Result<u32, Fault> {
    let rd = reg_field(word, 12);
    let (operand, pc_extra) = shifter_operand(state, word, form);

    match opcode {
        DataOpcode::Add => {
            let lhs = read_operand(state, reg_field(word, 16), pc_extra);
            let rhs = operand.value;
            let (result, carry) = lhs.overflowing_add(rhs);
            let overflow = ((lhs ^ result) & (rhs ^ result)) >> 31 != 0;
            write_result(state, rd, result, set_flags, |flags| {
                flags.set_nz(result);
                flags.carry = carry;
                flags.overflow = overflow;
            })
        }
        DataOpcode::Mov => write_result(state, rd, operand.value, set_flags, |flags| {
            flags.set_nz(operand.value);
            flags.carry = operand.carry;
        }),
        _ => Err(unimplemented(state, opcode.mnemonic(), word)),
    }
}

/// Commits a data-processing result, handling the `r15` destination forms.
fn write_result(
    state: &mut ArchitecturalState,
    rd: usize,
    result: u32,
    set_flags: bool,
    update_flags: impl FnOnce(&mut StatusFlags),
) -> Result<u32, Fault> {
    if rd == REG_PC {
        if set_flags {
            state.restore_cpsr_from_spsr()?;
        }
        state.set_reg(REG_PC, result);
        return Ok(cycle_cost(CycleCostKind::DataProcessing)
            + cycle_cost(CycleCostKind::PipelineRefill));
    }
    if set_flags {
        update_flags(state.flags_mut());
    }
    state.set_reg(rd, result);
    Ok(cycle_cost(CycleCostKind::DataProcessing))
}

fn single_transfer(
    state: &mut ArchitecturalState,
    memory: &mut dyn Memory,
    word: u32,
    form: TransferForm,
) -> Result<u32, Fault> {
    let rn = reg_field(word, 16);
    let rd = reg_field(word, 12);
    let address = transfer_address(state, word, form);

    if form.load {
        let value = if form.byte {
            u32::from(memory.read8(address.access))
        } else {
            validate_word_alignment(address.access)?;
            memory.read32(address.access)
        };
        if form.writes_back() {
            state.set_reg(rn, address.updated_base);
        }
        state.set_reg(rd, value);
        return Ok(cycle_cost(CycleCostKind::Load));
    }

    let value = read_operand(state, rd, 4);
    if form.byte {
        memory.write8(address.access, value.to_le_bytes()[0]);
    } else {
        memory.write32(force_word_alignment(address.access), value);
    }
    if form.writes_back() {
        state.set_reg(rn, address.updated_base);
    }
    Ok(cycle_cost(CycleCostKind::Store))
}
