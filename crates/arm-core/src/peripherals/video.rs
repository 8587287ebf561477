//! Scanline timing unit: alternates draw and horizontal blank per line and
//! tracks vertical blank and completed frames.

use log::trace;

use super::Peripherals;
use crate::api::VideoTimingConfig;
use crate::scheduler::{EventSource, Scheduler};

/// Portion of the current scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum VideoPhase {
    /// Pixels are being drawn.
    #[default]
    Draw,
    /// Horizontal blank.
    HBlank,
}

/// Scanline counter advanced by scheduler events under [`EventSource::Video`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct VideoTiming {
    config: VideoTimingConfig,
    scanline: u32,
    phase: VideoPhase,
    vblank: bool,
    frames: u64,
}

impl VideoTiming {
    /// Starts at line 0 in the draw phase and schedules the end of that draw.
    pub fn new(config: VideoTimingConfig, scheduler: &mut Scheduler<Peripherals>) -> Self {
        scheduler.schedule_relative(EventSource::Video, config.hdraw_ticks.max(1), draw_end);
        Self {
            config,
            scanline: 0,
            phase: VideoPhase::Draw,
            vblank: false,
            frames: 0,
        }
    }

    /// Current line, `0..total_lines`.
    #[must_use]
    pub const fn scanline(&self) -> u32 {
        self.scanline
    }

    /// Current portion of the line.
    #[must_use]
    pub const fn phase(&self) -> VideoPhase {
        self.phase
    }

    /// Whether the current line is past the visible area.
    #[must_use]
    pub const fn in_vblank(&self) -> bool {
        self.vblank
    }

    /// Frames completed since construction.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    fn next_line(&mut self) {
        self.scanline += 1;
        if self.scanline >= self.config.total_lines {
            self.scanline = 0;
            self.frames += 1;
        }
        self.vblank = self.scanline >= self.config.visible_lines;
        self.phase = VideoPhase::Draw;
    }
}

fn draw_end(peripherals: &mut Peripherals, scheduler: &mut Scheduler<Peripherals>, lateness: u64) {
    catch_up(&mut peripherals.video, scheduler, VideoPhase::Draw, lateness);
}

fn blank_end(peripherals: &mut Peripherals, scheduler: &mut Scheduler<Peripherals>, lateness: u64) {
    catch_up(&mut peripherals.video, scheduler, VideoPhase::HBlank, lateness);
}

/// Applies the end of `ended` and every later boundary already covered by
/// `lateness`, then schedules the next boundary on the nominal grid.
fn catch_up(
    video: &mut VideoTiming,
    scheduler: &mut Scheduler<Peripherals>,
    mut ended: VideoPhase,
    mut lateness: u64,
) {
    loop {
        match ended {
            VideoPhase::Draw => {
                video.phase = VideoPhase::HBlank;
                trace!("line {} hblank at {}", video.scanline, scheduler.now());
                let interval = video.config.hblank_ticks.max(1);
                if lateness < interval {
                    scheduler.schedule_relative(EventSource::Video, interval - lateness, blank_end);
                    return;
                }
                lateness -= interval;
                ended = VideoPhase::HBlank;
            }
            VideoPhase::HBlank => {
                video.next_line();
                let interval = video.config.hdraw_ticks.max(1);
                if lateness < interval {
                    scheduler.schedule_relative(EventSource::Video, interval - lateness, draw_end);
                    return;
                }
                lateness -= interval;
                ended = VideoPhase::Draw;
            }
        }
    }
}
