//! ARM7TDMI-style instruction execution core with a discrete-event scheduler.

/// Memory interface consumed by the core and a flat test implementation.
pub mod memory;
pub use memory::{
    force_word_alignment, validate_word_alignment, FlatMemory, Memory, DEFAULT_FLAT_MEMORY_BYTES,
    WORD_ACCESS_BYTES,
};

/// Host-facing configuration and trace hook types.
pub mod api;
pub use api::{
    CoreConfig, MachineConfig, TraceEvent, TraceSink, VideoTimingConfig, DEFAULT_ENTRY_POINT,
};

/// Register file, mode banking and status registers.
pub mod state;
pub use state::{
    ArchitecturalState, Mode, RunState, StatusFlags, GENERAL_REGISTER_COUNT, REG_LR, REG_PC,
    REG_SP,
};

/// Condition-code evaluation.
pub mod condition;
pub use condition::{evaluate, CONDITION_MNEMONICS};

/// Barrel shifter.
pub mod shifter;
pub use shifter::{ShiftKind, ShifterOutput};

/// Bit-pattern instruction classification.
pub mod encoding;
pub use encoding::{ArmClass, BitPattern, ThumbClass};

/// Dispatch tables mapping decode keys to executor entries.
pub mod decoder;
pub use decoder::{ArmDispatchTable, ArmEntry, ThumbDispatchTable, ThumbEntry};

/// Fault taxonomy surfaced by aborted instructions.
pub mod fault;
pub use fault::{Fault, FaultKind, InstructionSet};

/// Nominal cycle-cost table.
pub mod timing;
pub use timing::{cycle_cost, CycleCostKind, CYCLE_COST_TABLE};

/// Fetch, condition check, dispatch and pipeline update.
pub mod execute;
pub use execute::{step_one, DispatchTables};

/// CPU wrapper owning state and dispatch tables.
pub mod cpu;
pub use cpu::Cpu;

/// Discrete-event scheduler.
pub mod scheduler;
pub use scheduler::{EventCallback, EventSource, ScheduledEvent, Scheduler};

/// Scheduler-driven peripherals.
pub mod peripherals;
pub use peripherals::{Peripherals, VideoPhase, VideoTiming};

/// Top-level driving loop.
pub mod machine;
pub use machine::Machine;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
