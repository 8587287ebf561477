//! Architectural CPU state model primitives.

/// Shadow register banks and saved status registers.
pub mod banks;
/// Processor modes.
pub mod mode;
/// Status register bit layout.
pub mod psr;
/// Visible register file and mode-switching register bank manager.
pub mod registers;
/// Host-observable execution state machine.
pub mod run_state;

pub use banks::{BankedRegisters, SavedStatusRegisters};
pub use mode::{Bank, Mode};
pub use psr::{
    field_mask, StatusFlags, PSR_C, PSR_CONTROL_LANE, PSR_EXTENSION_LANE, PSR_F, PSR_FLAGS_LANE,
    PSR_I, PSR_MODE_MASK, PSR_N, PSR_Q, PSR_STATUS_LANE, PSR_T, PSR_V, PSR_Z,
};
pub use registers::{ArchitecturalState, GENERAL_REGISTER_COUNT, REG_LR, REG_PC, REG_SP};
pub use run_state::RunState;
