/// Instruction forms that have fixed cycle costs in the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleCostKind {
    /// ARM instruction whose condition evaluated false.
    ConditionFailed,
    /// Data-processing instruction writing a general register.
    DataProcessing,
    /// Extra cost when a data-processing result is written to `r15`.
    PipelineRefill,
    /// `B`/`BL`.
    Branch,
    /// `BX`/`BLX` register form.
    BranchExchange,
    /// Single-register load.
    Load,
    /// Single-register store.
    Store,
    /// `MSR` status move.
    StatusMove,
    /// Thumb PC-relative literal load.
    ThumbLiteralLoad,
    /// Thumb shift and ALU operations.
    ThumbAlu,
}

/// Single source-of-truth cycle-cost table for fixed-cost instruction forms.
pub const CYCLE_COST_TABLE: &[(CycleCostKind, u32)] = &[
    (CycleCostKind::ConditionFailed, 1),
    (CycleCostKind::DataProcessing, 1),
    (CycleCostKind::PipelineRefill, 2),
    (CycleCostKind::Branch, 3),
    (CycleCostKind::BranchExchange, 3),
    (CycleCostKind::Load, 3),
    (CycleCostKind::Store, 2),
    (CycleCostKind::StatusMove, 1),
    (CycleCostKind::ThumbLiteralLoad, 3),
    (CycleCostKind::ThumbAlu, 1),
];

/// Looks up the cycle cost for a cycle-cost kind.
#[must_use]
pub fn cycle_cost(kind: CycleCostKind) -> u32 {
    CYCLE_COST_TABLE
        .iter()
        .find_map(|(entry_kind, cycles)| (*entry_kind == kind).then_some(*cycles))
        .unwrap_or(1)
}
