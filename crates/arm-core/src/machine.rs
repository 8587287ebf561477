//! Driving loop: one instruction, then the scheduler catches up.

use log::{debug, warn};

use crate::api::{MachineConfig, TraceEvent, TraceSink};
use crate::cpu::Cpu;
use crate::fault::Fault;
use crate::memory::Memory;
use crate::peripherals::{Peripherals, VideoTiming};
use crate::scheduler::Scheduler;
use crate::state::RunState;

/// CPU, memory, scheduler and peripherals advanced in lockstep.
pub struct Machine<M: Memory> {
    config: MachineConfig,
    cpu: Cpu,
    memory: M,
    scheduler: Scheduler<Peripherals>,
    peripherals: Peripherals,
    run_state: RunState,
    trace: Option<Box<dyn TraceSink>>,
}

impl<M: Memory + std::fmt::Debug> std::fmt::Debug for Machine<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("config", &self.config)
            .field("cpu", &self.cpu)
            .field("memory", &self.memory)
            .field("scheduler", &self.scheduler)
            .field("peripherals", &self.peripherals)
            .field("run_state", &self.run_state)
            .field("trace_attached", &self.trace.is_some())
            .finish()
    }
}

impl<M: Memory> Machine<M> {
    /// Builds the CPU and peripherals; peripherals seed their first events.
    #[must_use]
    pub fn new(config: MachineConfig, memory: M) -> Self {
        let cpu = Cpu::new(&config.core);
        let mut scheduler = Scheduler::new();
        let peripherals = Peripherals::new(&config.video, &mut scheduler);
        Self {
            config,
            cpu,
            memory,
            scheduler,
            peripherals,
            run_state: RunState::Running,
            trace: None,
        }
    }

    /// Executes one instruction, advances the clock by its cost and fires
    /// every event that became due. Returns the cycles consumed.
    ///
    /// # Errors
    ///
    /// Returns the fault that aborted the instruction. The fault is latched
    /// and returned again by every later call until [`Machine::reset`].
    pub fn step(&mut self) -> Result<u32, Fault> {
        if let Some(fault) = self.run_state.latched_fault() {
            return Err(fault);
        }

        let mut sink: Option<&mut dyn TraceSink> = match self.trace.as_mut() {
            Some(sink) if self.config.core.tracing_enabled => Some(&mut **sink),
            _ => None,
        };

        let retire_sink = sink.as_mut().map(|s| &mut **s as &mut dyn TraceSink);
        match self.cpu.step_with(&mut self.memory, retire_sink) {
            Ok(cycles) => {
                self.scheduler.advance(u64::from(cycles));
                while let Some(event) = self.scheduler.pop_due_event() {
                    let (source, due) = (event.source(), event.due());
                    let lateness = event.fire(&mut self.peripherals, &mut self.scheduler);
                    if let Some(sink) = sink.as_mut() {
                        sink.on_event(TraceEvent::EventFired {
                            source,
                            due,
                            lateness,
                        });
                    }
                }
                Ok(cycles)
            }
            Err(fault) => {
                warn!(
                    "fault latched at {:#010x} (tick {}): {fault}",
                    self.cpu.pc(),
                    self.scheduler.now()
                );
                self.run_state = RunState::FaultLatched(fault);
                Err(fault)
            }
        }
    }

    /// Steps until the clock has moved at least `ticks` forward.
    ///
    /// Returns the ticks actually elapsed, which may overshoot by part of the
    /// last instruction.
    ///
    /// # Errors
    ///
    /// Stops at the first fault and returns it.
    pub fn run_for(&mut self, ticks: u64) -> Result<u64, Fault> {
        let start = self.scheduler.now();
        let target = start.saturating_add(ticks);
        while self.scheduler.now() < target {
            self.step()?;
        }
        Ok(self.scheduler.now() - start)
    }

    /// Restores power-on CPU, scheduler and peripheral state. Memory and the
    /// attached trace sink are kept.
    pub fn reset(&mut self) {
        debug!("machine reset at tick {}", self.scheduler.now());
        self.cpu.reset(&self.config.core);
        self.scheduler = Scheduler::new();
        self.peripherals = Peripherals::new(&self.config.video, &mut self.scheduler);
        self.run_state = RunState::Running;
    }

    /// Configuration the machine was built with.
    #[must_use]
    pub const fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// The CPU.
    #[must_use]
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable CPU, for hosts seeding registers.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// The memory.
    #[must_use]
    pub const fn memory(&self) -> &M {
        &self.memory
    }

    /// Mutable memory, for loading programs.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// The scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler<Peripherals> {
        &self.scheduler
    }

    /// Every peripheral.
    #[must_use]
    pub const fn peripherals(&self) -> &Peripherals {
        &self.peripherals
    }

    /// Video timing unit.
    #[must_use]
    pub const fn video(&self) -> &VideoTiming {
        &self.peripherals.video
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Attaches `sink`; events reach it only while tracing is enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Detaches and returns the current sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace.take()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::Machine;
    use crate::api::{CoreConfig, MachineConfig, TraceEvent, TraceSink};
    use crate::fault::FaultKind;
    use crate::memory::{FlatMemory, Memory};
    use crate::peripherals::VideoPhase;
    use crate::scheduler::EventSource;
    use crate::state::RunState;

    const BRANCH_TO_SELF: u32 = 0xEAFF_FFFE;
    const LDM_WRITEBACK: u32 = 0xE8BD_0001;

    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<TraceEvent>>>);

    impl TraceSink for Shared {
        fn on_event(&mut self, event: TraceEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    fn machine_with(word: u32, tracing: bool) -> Machine<FlatMemory> {
        let mut memory = FlatMemory::new(0x1000);
        memory.write32(0, word);
        let config = MachineConfig {
            core: CoreConfig {
                entry_point: 0,
                tracing_enabled: tracing,
                ..CoreConfig::default()
            },
            ..MachineConfig::default()
        };
        Machine::new(config, memory)
    }

    #[test]
    fn construction_seeds_video_event() {
        let machine = machine_with(BRANCH_TO_SELF, false);
        assert_eq!(machine.scheduler().due_tick(EventSource::Video), Some(960));
        assert_eq!(machine.run_state(), RunState::Running);
    }

    #[test]
    fn step_advances_clock_by_cycle_cost() {
        let mut machine = machine_with(BRANCH_TO_SELF, false);
        assert_eq!(machine.step(), Ok(3));
        assert_eq!(machine.scheduler().now(), 3);
        assert_eq!(machine.cpu().pc(), 0);
    }

    #[test]
    fn run_for_one_line_fires_both_video_boundaries() {
        let mut machine = machine_with(BRANCH_TO_SELF, false);
        // 3-cycle branches land exactly on 960 and one tick past 1232.
        assert_eq!(machine.run_for(1232), Ok(1233));
        assert_eq!(machine.video().scanline(), 1);
        assert_eq!(machine.video().phase(), VideoPhase::Draw);
        assert_eq!(
            machine.scheduler().due_tick(EventSource::Video),
            Some(1232 + 960)
        );
    }

    #[test]
    fn fault_is_latched_until_reset() {
        let mut machine = machine_with(LDM_WRITEBACK, false);
        let fault = machine.step().expect_err("block transfer is unbound");
        assert_eq!(fault.kind(), FaultKind::Decode);
        assert_eq!(machine.run_state(), RunState::FaultLatched(fault));

        assert_eq!(machine.step(), Err(fault));
        assert_eq!(machine.run_for(100), Err(fault));
        assert_eq!(machine.scheduler().now(), 0);
        assert_eq!(machine.cpu().pc(), 0);

        machine.memory_mut().write32(0, BRANCH_TO_SELF);
        machine.reset();
        assert!(machine.run_state().is_running());
        assert_eq!(machine.step(), Ok(3));
    }

    #[test]
    fn reset_rewinds_clock_and_video() {
        let mut machine = machine_with(BRANCH_TO_SELF, false);
        machine.run_for(5000).expect("branch loop never faults");
        assert!(machine.video().scanline() > 0);
        machine.reset();
        assert_eq!(machine.scheduler().now(), 0);
        assert_eq!(machine.video().scanline(), 0);
        assert_eq!(machine.scheduler().pending_len(), 1);
    }

    #[test]
    fn enabled_trace_reports_instructions_and_events() {
        let mut machine = machine_with(BRANCH_TO_SELF, true);
        let sink = Shared::default();
        machine.set_trace_sink(Box::new(sink.clone()));
        machine.run_for(960).expect("branch loop never faults");

        let events = sink.0.borrow();
        let retired = events
            .iter()
            .filter(|event| matches!(event, TraceEvent::InstructionRetired { .. }))
            .count();
        assert_eq!(retired, 320);
        assert_eq!(
            events.last(),
            Some(&TraceEvent::EventFired {
                source: EventSource::Video,
                due: 960,
                lateness: 0,
            })
        );
    }

    #[test]
    fn disabled_trace_stays_silent() {
        let mut machine = machine_with(BRANCH_TO_SELF, false);
        let sink = Shared::default();
        machine.set_trace_sink(Box::new(sink.clone()));
        machine.run_for(100).expect("branch loop never faults");
        assert!(sink.0.borrow().is_empty());
        assert!(machine.take_trace_sink().is_some());
    }
}
