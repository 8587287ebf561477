use crate::fault::{FaultKind, InstructionSet};
use crate::scheduler::EventSource;
use crate::state::Mode;

/// Default first instruction address (start of cartridge ROM on the GBA map).
pub const DEFAULT_ENTRY_POINT: u32 = 0x0800_0000;

/// CPU construction and reset parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Address of the first instruction executed after construction or reset.
    pub entry_point: u32,
    /// Mode the CPU starts in.
    pub initial_mode: Mode,
    /// Start in Thumb state instead of ARM.
    pub start_in_thumb: bool,
    /// Enables deterministic trace callback dispatch.
    pub tracing_enabled: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT,
            initial_mode: Mode::System,
            start_in_thumb: false,
            tracing_enabled: false,
        }
    }
}

/// Scanline timing parameters, in CPU ticks and lines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct VideoTimingConfig {
    /// Visible portion of a scanline.
    pub hdraw_ticks: u64,
    /// Horizontal blank portion of a scanline.
    pub hblank_ticks: u64,
    /// Lines drawn before vertical blank starts.
    pub visible_lines: u32,
    /// Lines per frame, including vertical blank.
    pub total_lines: u32,
}

impl Default for VideoTimingConfig {
    fn default() -> Self {
        Self {
            hdraw_ticks: 960,
            hblank_ticks: 272,
            visible_lines: 160,
            total_lines: 228,
        }
    }
}

impl VideoTimingConfig {
    /// Ticks per full scanline.
    #[must_use]
    pub const fn line_ticks(&self) -> u64 {
        self.hdraw_ticks + self.hblank_ticks
    }

    /// Ticks per full frame.
    #[must_use]
    pub const fn frame_ticks(&self) -> u64 {
        self.line_ticks() * self.total_lines as u64
    }
}

/// Everything needed to build a [`crate::Machine`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// CPU parameters.
    pub core: CoreConfig,
    /// Video timing parameters.
    pub video: VideoTimingConfig,
}

/// Deterministic trace events emitted at step boundaries when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Instruction fetched.
    InstructionStart {
        /// Instruction set used for the fetch.
        set: InstructionSet,
        /// Fetch address.
        address: u32,
        /// Raw instruction (Thumb halfwords zero-extended).
        word: u32,
    },
    /// ARM condition evaluated false; no executor ran.
    ConditionFailed {
        /// Instruction address.
        address: u32,
        /// 4-bit condition code.
        condition: u32,
    },
    /// Instruction retired.
    InstructionRetired {
        /// Instruction address.
        address: u32,
        /// Nominal cycle cost.
        cycles: u32,
    },
    /// Instruction aborted by a fault.
    FaultRaised {
        /// Instruction address.
        address: u32,
        /// Fault classification.
        kind: FaultKind,
    },
    /// Scheduler event fired.
    EventFired {
        /// Owner of the event.
        source: EventSource,
        /// Tick the event was due at.
        due: u64,
        /// Ticks past due when it fired.
        lateness: u64,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
