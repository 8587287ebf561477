use log::debug;

use super::banks::{BankedRegisters, SavedStatusRegisters};
use super::mode::Mode;
use super::psr::{StatusFlags, PSR_MODE_MASK};
use crate::fault::{Fault, InstructionSet};

/// Number of architecturally visible general-purpose registers (`r0..=r15`).
pub const GENERAL_REGISTER_COUNT: usize = 16;
/// Stack pointer index.
pub const REG_SP: usize = 13;
/// Link register index.
pub const REG_LR: usize = 14;
/// Program counter index.
pub const REG_PC: usize = 15;

/// Full architectural register state: visible file, shadow banks, and status registers.
///
/// `r15` holds the address of the executing instruction plus the pipeline
/// offset of the active instruction set. Every write to `r15` goes through
/// [`ArchitecturalState::set_reg`], which re-primes that offset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    r: [u32; GENERAL_REGISTER_COUNT],
    banks: BankedRegisters,
    flags: StatusFlags,
    mode: Mode,
    spsr: SavedStatusRegisters,
    pipeline_flushed: bool,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self::new(0, Mode::System, false)
    }
}

impl ArchitecturalState {
    /// Creates a primed register state that will execute `entry` first.
    #[must_use]
    pub fn new(entry: u32, mode: Mode, thumb: bool) -> Self {
        let mut state = Self {
            r: [0; GENERAL_REGISTER_COUNT],
            banks: BankedRegisters::default(),
            flags: StatusFlags {
                thumb,
                ..StatusFlags::default()
            },
            mode,
            spsr: SavedStatusRegisters::default(),
            pipeline_flushed: false,
        };
        state.set_pc(entry);
        state
    }

    /// Reads a visible register. `r15` includes the pipeline offset.
    #[must_use]
    pub const fn reg(&self, index: usize) -> u32 {
        self.r[index & 0xF]
    }

    /// Whole visible register file.
    #[must_use]
    pub const fn registers(&self) -> &[u32; GENERAL_REGISTER_COUNT] {
        &self.r
    }

    /// Writes a visible register. A write to `r15` flushes the pipeline.
    pub fn set_reg(&mut self, index: usize, value: u32) {
        let index = index & 0xF;
        self.r[index] = value;
        if index == REG_PC {
            self.flush_pipeline();
        }
    }

    /// Address of the next instruction to execute.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.r[REG_PC].wrapping_sub(self.instruction_set().pipeline_offset())
    }

    /// Moves execution to `address` in the current instruction set.
    pub fn set_pc(&mut self, address: u32) {
        self.set_reg(REG_PC, address);
        self.pipeline_flushed = false;
    }

    /// Instruction set selected by the Thumb flag.
    #[must_use]
    pub const fn instruction_set(&self) -> InstructionSet {
        if self.flags.thumb {
            InstructionSet::Thumb
        } else {
            InstructionSet::Arm
        }
    }

    /// Re-primes `r15` so the next fetch reads the instruction at the current
    /// `r15` value, aligned to the active instruction size.
    pub fn flush_pipeline(&mut self) {
        self.prime(self.r[REG_PC]);
        self.pipeline_flushed = true;
    }

    fn prime(&mut self, address: u32) {
        let set = self.instruction_set();
        let target = address & !(set.instruction_size() - 1);
        self.r[REG_PC] = target.wrapping_add(set.pipeline_offset());
    }

    /// Advances `r15` by one instruction of the active set.
    pub const fn advance_pc(&mut self) {
        let size = self.instruction_set().instruction_size();
        self.r[REG_PC] = self.r[REG_PC].wrapping_add(size);
    }

    /// Returns whether a flush happened since the last call, clearing the marker.
    pub const fn take_pipeline_flush(&mut self) -> bool {
        let flushed = self.pipeline_flushed;
        self.pipeline_flushed = false;
        flushed
    }

    /// Puts back a marker taken by [`Self::take_pipeline_flush`] when the
    /// step that took it is abandoned.
    pub(crate) const fn restore_pipeline_flush(&mut self, flushed: bool) {
        self.pipeline_flushed = flushed;
    }

    /// Current condition and control flags.
    #[must_use]
    pub const fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// Mutable access to the condition and control flags.
    ///
    /// Changing `thumb` here does not re-prime the pipeline; the execution
    /// engine detects that case after each instruction.
    pub const fn flags_mut(&mut self) -> &mut StatusFlags {
        &mut self.flags
    }

    /// Current processor mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches mode, swapping the outgoing bank out and the incoming bank in.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        self.banks.store(self.mode, &self.r);
        self.banks.load(mode, &mut self.r);
        debug!("mode switch {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    /// Packs flags and mode into the CPSR word.
    #[must_use]
    pub const fn cpsr(&self) -> u32 {
        self.flags.bits() | self.mode.bits()
    }

    /// Unpacks a CPSR word, routing the mode field through [`Self::set_mode`].
    ///
    /// Flipping the Thumb flag re-primes `r15` for the new instruction set so
    /// that [`Self::pc`] keeps addressing the same instruction.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidMode`] when the mode field is undefined. No
    /// state is changed in that case.
    pub fn set_cpsr(&mut self, value: u32) -> Result<(), Fault> {
        let mode = Mode::from_bits(value & PSR_MODE_MASK).ok_or(Fault::InvalidMode {
            bits: (value | 0x10) & PSR_MODE_MASK,
        })?;
        let pc = self.pc();
        let was_thumb = self.flags.thumb;
        self.flags = StatusFlags::from_bits(value);
        if self.flags.thumb != was_thumb {
            self.prime(pc);
        }
        self.set_mode(mode);
        Ok(())
    }

    /// Reads the SPSR of the current mode.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidSavedStatus`] in User and System mode.
    pub const fn spsr(&self) -> Result<u32, Fault> {
        match self.spsr.get(self.mode) {
            Some(value) => Ok(value),
            None => Err(Fault::InvalidSavedStatus { mode: self.mode }),
        }
    }

    /// Writes the SPSR of the current mode.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidSavedStatus`] in User and System mode.
    pub fn set_spsr(&mut self, value: u32) -> Result<(), Fault> {
        let mode = self.mode;
        let slot = self
            .spsr
            .get_mut(mode)
            .ok_or(Fault::InvalidSavedStatus { mode })?;
        *slot = value;
        Ok(())
    }

    /// Copies the current SPSR into CPSR (exception return).
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidSavedStatus`] in User and System mode, and
    /// [`Fault::InvalidMode`] when the saved mode field is undefined.
    pub fn restore_cpsr_from_spsr(&mut self) -> Result<(), Fault> {
        let saved = self.spsr()?;
        debug!("exception return from {:?} with spsr {saved:#010x}", self.mode);
        self.set_cpsr(saved)
    }
}
