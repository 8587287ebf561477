//! Thumb-state executors.

use super::helpers::{low_reg_field, unimplemented};
use crate::decoder::{ThumbAluOpcode, ThumbEntry};
use crate::fault::Fault;
use crate::memory::Memory;
use crate::shifter::{shift_by_immediate, shift_by_register, ShiftKind, ShifterOutput};
use crate::state::{ArchitecturalState, REG_PC};
use crate::timing::{cycle_cost, CycleCostKind};

/// Runs the executor bound to `entry` for `halfword`.
pub fn execute(
    entry: ThumbEntry,
    state: &mut ArchitecturalState,
    memory: &mut dyn Memory,
    halfword: u16,
) -> Result<u32, Fault> {
    let word = u32::from(halfword);
    match entry {
        ThumbEntry::Unbound => Err(Fault::Decode {
            set: state.instruction_set(),
            address: state.pc(),
            word,
        }),
        ThumbEntry::LiteralLoad => Ok(literal_load(state, memory, word)),
        ThumbEntry::DataProcessing { opcode } => data_processing(state, word, opcode),
        ThumbEntry::ShiftByImmediate { kind } => Ok(shift_immediate(state, word, kind)),
    }
}

fn literal_load(state: &mut ArchitecturalState, memory: &mut dyn Memory, word: u32) -> u32 {
    let rd = low_reg_field(word, 8);
    let address = (state.reg(REG_PC) & !3).wrapping_add((word & 0xFF) << 2);
    let value = memory.read32(address);
    state.set_reg(rd, value);
    cycle_cost(CycleCostKind::ThumbLiteralLoad)
}

fn shift_immediate(state: &mut ArchitecturalState, word: u32, kind: ShiftKind) -> u32 {
    let rd = low_reg_field(word, 0);
    let source = state.reg(low_reg_field(word, 3));
    let out = shift_by_immediate(kind, source, (word >> 6) & 0x1F, state.flags().carry);
    commit_shift(state, rd, out);
    cycle_cost(CycleCostKind::ThumbAlu)
}

fn data_processing(
    state: &mut ArchitecturalState,
    word: u32,
    opcode: ThumbAluOpcode,
) -> Result<u32, Fault> {
    let Some(kind) = opcode.shift_kind() else {
        return Err(unimplemented(state, opcode.mnemonic(), word));
    };
    let rd = low_reg_field(word, 0);
    let amount = state.reg(low_reg_field(word, 3)) & 0xFF;
    let out = shift_by_register(kind, state.reg(rd), amount, state.flags().carry);
    commit_shift(state, rd, out);
    Ok(cycle_cost(CycleCostKind::ThumbAlu))
}

fn commit_shift(state: &mut ArchitecturalState, rd: usize, out: ShifterOutput) {
    let flags = state.flags_mut();
    flags.set_nz(out.value);
    flags.carry = out.carry;
    state.set_reg(rd, out.value);
}
