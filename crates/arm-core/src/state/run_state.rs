use crate::fault::Fault;

/// Host-observable execution state of a [`crate::Machine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// A fault aborted an instruction; nothing executes until reset.
    FaultLatched(Fault),
}

impl RunState {
    /// Returns the currently latched fault, if this state is fault-latched.
    #[must_use]
    pub const fn latched_fault(self) -> Option<Fault> {
        match self {
            Self::FaultLatched(cause) => Some(cause),
            Self::Running => None,
        }
    }

    /// Whether another instruction may execute.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;
    use crate::fault::Fault;

    #[test]
    fn run_state_default_is_running() {
        assert_eq!(RunState::default(), RunState::Running);
        assert!(RunState::default().is_running());
    }

    #[test]
    fn latched_fault_accessor_reports_only_fault_latched_variant() {
        let fault = Fault::Alignment { address: 0x0200_0002 };
        assert_eq!(RunState::Running.latched_fault(), None);
        assert_eq!(RunState::FaultLatched(fault).latched_fault(), Some(fault));
        assert!(!RunState::FaultLatched(fault).is_running());
    }
}
