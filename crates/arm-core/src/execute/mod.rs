//! Fetch/execute engine for the ARM and Thumb instruction sets.
//!
//! One step fetches at `pc()`, evaluates the condition (ARM only), runs the
//! executor bound in the dispatch table, and then advances `r15` by one
//! instruction unless the executor flushed the pipeline. A faulting step
//! leaves the program counter on the faulting instruction.

mod arm;
mod helpers;
mod thumb;

pub use helpers::{branch_offset, read_operand, transfer_address, TransferAddress};

use log::trace;

use crate::api::{TraceEvent, TraceSink};
use crate::condition::{evaluate, CONDITION_MNEMONICS};
use crate::decoder::{ArmDispatchTable, ArmEntry, ThumbDispatchTable, ThumbEntry};
use crate::fault::{Fault, InstructionSet};
use crate::memory::Memory;
use crate::state::ArchitecturalState;
use crate::timing::{cycle_cost, CycleCostKind};

/// Read-only dispatch tables for both instruction sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchTables {
    /// ARM table.
    pub arm: ArmDispatchTable,
    /// Thumb table.
    pub thumb: ThumbDispatchTable,
}

impl DispatchTables {
    /// Builds both tables.
    #[must_use]
    pub fn build() -> Self {
        Self {
            arm: ArmDispatchTable::build(),
            thumb: ThumbDispatchTable::build(),
        }
    }
}

fn emit(sink: &mut Option<&mut dyn TraceSink>, event: TraceEvent) {
    if let Some(sink) = sink.as_deref_mut() {
        sink.on_event(event);
    }
}

/// Executes exactly one instruction and returns its cycle cost.
///
/// # Errors
///
/// Returns the [`Fault`] raised by decode or execution. Executors check every
/// fault condition before mutating state, so `pc()` still addresses the
/// faulting instruction.
pub fn step_one(
    state: &mut ArchitecturalState,
    tables: &DispatchTables,
    memory: &mut dyn Memory,
    mut sink: Option<&mut dyn TraceSink>,
) -> Result<u32, Fault> {
    let set = state.instruction_set();
    let address = state.pc();
    let host_flush = state.take_pipeline_flush();

    let result = match set {
        InstructionSet::Arm => {
            let word = memory.read32(address);
            trace!("{address:#010x}: {word:#010x}");
            emit(&mut sink, TraceEvent::InstructionStart { set, address, word });
            let condition = word >> 28;
            if evaluate(condition, state.flags()) {
                match tables.arm.lookup(word) {
                    ArmEntry::Unbound => Err(helpers::unbound(set, address, word)),
                    entry => arm::execute(entry, state, memory, word),
                }
            } else {
                trace!("{address:#010x}: {} failed", CONDITION_MNEMONICS[condition as usize]);
                emit(&mut sink, TraceEvent::ConditionFailed { address, condition });
                Ok(cycle_cost(CycleCostKind::ConditionFailed))
            }
        }
        InstructionSet::Thumb => {
            let halfword = memory.read16(address);
            let word = u32::from(halfword);
            trace!("{address:#010x}: {halfword:#06x}");
            emit(&mut sink, TraceEvent::InstructionStart { set, address, word });
            match tables.thumb.lookup(halfword) {
                ThumbEntry::Unbound => Err(helpers::unbound(set, address, word)),
                entry => thumb::execute(entry, state, memory, halfword),
            }
        }
    };

    match result {
        Ok(cycles) => {
            finish_step(state, set, address);
            emit(&mut sink, TraceEvent::InstructionRetired { address, cycles });
            Ok(cycles)
        }
        Err(fault) => {
            state.restore_pipeline_flush(host_flush);
            emit(
                &mut sink,
                TraceEvent::FaultRaised {
                    address,
                    kind: fault.kind(),
                },
            );
            Err(fault)
        }
    }
}

/// Moves `r15` past the retired instruction unless it was already redirected.
fn finish_step(state: &mut ArchitecturalState, executed_in: InstructionSet, address: u32) {
    if state.take_pipeline_flush() {
        return;
    }
    if state.instruction_set() == executed_in {
        state.advance_pc();
    } else {
        state.set_pc(address.wrapping_add(executed_in.instruction_size()));
    }
}
