//! Scheduler-driven peripherals owned by a [`crate::Machine`].

/// Scanline and frame timing.
pub mod video;

pub use video::{VideoPhase, VideoTiming};

use crate::api::VideoTimingConfig;
use crate::scheduler::Scheduler;

/// Every peripheral, passed as the context of scheduler callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peripherals {
    /// Video timing unit.
    pub video: VideoTiming,
}

impl Peripherals {
    /// Builds every peripheral and seeds their first scheduler events.
    pub fn new(video: &VideoTimingConfig, scheduler: &mut Scheduler<Self>) -> Self {
        Self {
            video: VideoTiming::new(video.clone(), scheduler),
        }
    }
}
