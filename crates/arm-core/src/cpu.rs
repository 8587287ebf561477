use crate::api::{CoreConfig, TraceSink};
use crate::execute::{step_one, DispatchTables};
use crate::fault::{Fault, InstructionSet};
use crate::memory::Memory;
use crate::state::{ArchitecturalState, Mode, StatusFlags, GENERAL_REGISTER_COUNT};

/// ARM7TDMI-style core: architectural state plus the dispatch tables built at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    state: ArchitecturalState,
    tables: DispatchTables,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl Cpu {
    /// Builds the dispatch tables and primes the pipeline at `config.entry_point`.
    #[must_use]
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            state: Self::initial_state(config),
            tables: DispatchTables::build(),
        }
    }

    fn initial_state(config: &CoreConfig) -> ArchitecturalState {
        ArchitecturalState::new(config.entry_point, config.initial_mode, config.start_in_thumb)
    }

    /// Restores power-on register state. The dispatch tables are kept.
    pub fn reset(&mut self, config: &CoreConfig) {
        self.state = Self::initial_state(config);
    }

    /// Executes one instruction and returns its nominal cycle cost.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that aborted the instruction; state is unchanged.
    pub fn step(&mut self, memory: &mut dyn Memory) -> Result<u32, Fault> {
        self.step_with(memory, None)
    }

    /// Same as [`Cpu::step`], reporting progress to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] that aborted the instruction; state is unchanged.
    pub fn step_traced(
        &mut self,
        memory: &mut dyn Memory,
        sink: &mut dyn TraceSink,
    ) -> Result<u32, Fault> {
        self.step_with(memory, Some(sink))
    }

    pub(crate) fn step_with(
        &mut self,
        memory: &mut dyn Memory,
        sink: Option<&mut dyn TraceSink>,
    ) -> Result<u32, Fault> {
        step_one(&mut self.state, &self.tables, memory, sink)
    }

    /// Architectural state.
    #[must_use]
    pub const fn state(&self) -> &ArchitecturalState {
        &self.state
    }

    /// Mutable architectural state, for hosts loading a snapshot or test fixture.
    pub fn state_mut(&mut self) -> &mut ArchitecturalState {
        &mut self.state
    }

    /// Dispatch tables built at construction.
    #[must_use]
    pub const fn tables(&self) -> &DispatchTables {
        &self.tables
    }

    /// Visible register `index`; `r15` includes the pipeline offset.
    #[must_use]
    pub const fn reg(&self, index: usize) -> u32 {
        self.state.reg(index)
    }

    /// Visible register file.
    #[must_use]
    pub const fn registers(&self) -> &[u32; GENERAL_REGISTER_COUNT] {
        self.state.registers()
    }

    /// Writes a register; writing `r15` flushes the pipeline.
    pub fn arm_set_reg(&mut self, index: usize, value: u32) {
        self.state.set_reg(index, value);
    }

    /// Address of the next instruction.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.state.pc()
    }

    /// Active instruction set.
    #[must_use]
    pub const fn instruction_set(&self) -> InstructionSet {
        self.state.instruction_set()
    }

    /// Condition and control flags.
    #[must_use]
    pub const fn flags(&self) -> StatusFlags {
        self.state.flags()
    }

    /// Current mode.
    #[must_use]
    pub const fn get_mode(&self) -> Mode {
        self.state.mode()
    }

    /// Switches mode with banking.
    pub fn set_mode(&mut self, mode: Mode) {
        self.state.set_mode(mode);
    }

    /// Packed CPSR.
    #[must_use]
    pub const fn get_cpsr(&self) -> u32 {
        self.state.cpsr()
    }

    /// Unpacks a CPSR word.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidMode`] for an undefined mode field.
    pub fn set_cpsr(&mut self, value: u32) -> Result<(), Fault> {
        self.state.set_cpsr(value)
    }

    /// SPSR of the current mode.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidSavedStatus`] in User and System mode.
    pub const fn get_spsr(&self) -> Result<u32, Fault> {
        self.state.spsr()
    }

    /// Writes the SPSR of the current mode.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidSavedStatus`] in User and System mode.
    pub fn set_spsr(&mut self, value: u32) -> Result<(), Fault> {
        self.state.set_spsr(value)
    }
}
