//! Scheduler and video timeline driven the way the machine loop drives them.

#![allow(clippy::pedantic, clippy::nursery)]

use arm_core::{
    EventSource, FaultKind, FlatMemory, Machine, MachineConfig, Memory, Peripherals, RunState,
    Scheduler, VideoPhase, VideoTimingConfig,
};
use log as _;
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const LINE: u64 = 1232;
const HDRAW: u64 = 960;
const LINES_PER_FRAME: u64 = 228;

fn assert_on_grid(peripherals: &Peripherals, now: u64) {
    let lines = now / LINE;
    let video = &peripherals.video;
    assert_eq!(u64::from(video.scanline()), lines % LINES_PER_FRAME, "tick {now}");
    assert_eq!(video.frames(), lines / LINES_PER_FRAME, "tick {now}");
    assert_eq!(video.in_vblank(), lines % LINES_PER_FRAME >= 160, "tick {now}");
    let expected_phase = if now % LINE < HDRAW {
        VideoPhase::Draw
    } else {
        VideoPhase::HBlank
    };
    assert_eq!(video.phase(), expected_phase, "tick {now}");
}

fn run_timeline(step: u64, until: u64) {
    let mut scheduler = Scheduler::new();
    let mut peripherals = Peripherals::new(&VideoTimingConfig::default(), &mut scheduler);
    while scheduler.now() < until {
        scheduler.advance(step);
        scheduler.drain(&mut peripherals);
        assert_on_grid(&peripherals, scheduler.now());
    }
}

#[rstest]
#[case::single_ticks(1)]
#[case::branch_cost(3)]
#[case::odd_cost(7)]
#[case::longer_than_hblank(300)]
#[case::longer_than_a_line(2000)]
fn one_line_per_1232_ticks_over_a_frame(#[case] step: u64) {
    run_timeline(step, LINE * LINES_PER_FRAME + LINE);
}

#[test]
fn blank_end_stays_on_nominal_grid_when_late() {
    let mut scheduler = Scheduler::new();
    let mut peripherals = Peripherals::new(&VideoTimingConfig::default(), &mut scheduler);
    scheduler.advance(HDRAW + 5);
    scheduler.drain(&mut peripherals);
    assert_eq!(scheduler.due_tick(EventSource::Video), Some(LINE));
    scheduler.advance(LINE - HDRAW);
    scheduler.drain(&mut peripherals);
    assert_eq!(scheduler.due_tick(EventSource::Video), Some(LINE + HDRAW));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn video_never_drifts_for_any_step_size(step in 1u64..5000) {
        run_timeline(step, LINE * LINES_PER_FRAME * 2);
    }
}

#[test]
fn machine_frame_matches_video_clock() {
    let mut memory = FlatMemory::new(0x1000);
    // B .
    memory.write32(0x100, 0xEAFF_FFFE);
    let mut config = MachineConfig::default();
    config.core.entry_point = 0x100;
    let mut machine = Machine::new(config, memory);

    let elapsed = machine.run_for(LINE * LINES_PER_FRAME).expect("loop never faults");
    assert!(elapsed >= LINE * LINES_PER_FRAME);
    assert_eq!(machine.video().frames(), 1);
    assert_on_grid(machine.peripherals(), machine.scheduler().now());
}

#[test]
fn machine_latches_faults_and_recovers_after_reset() {
    let mut memory = FlatMemory::new(0x1000);
    // MOV r0, #1 ; LDMIA sp!, {r0}
    memory.load_words(0, &[0xE3A0_0001, 0xE8BD_0001]);
    let mut config = MachineConfig::default();
    config.core.entry_point = 0;
    let mut machine = Machine::new(config, memory);

    let fault = machine.run_for(1000).expect_err("second instruction is unbound");
    assert_eq!(fault.kind(), FaultKind::Decode);
    assert_eq!(machine.scheduler().now(), 1);
    assert_eq!(machine.cpu().pc(), 4);
    assert_eq!(machine.step(), Err(fault));
    assert_eq!(machine.run_state(), RunState::FaultLatched(fault));

    // MOV r0, #1 ; B .
    machine.memory_mut().write32(4, 0xEAFF_FFFE);
    machine.reset();
    assert_eq!(machine.cpu().reg(0), 0);
    assert_eq!(machine.run_for(HDRAW), Ok(HDRAW + 1));
    assert_eq!(machine.video().phase(), VideoPhase::HBlank);
}
