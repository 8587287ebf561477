//! Prints a fingerprint of a short program run over one video frame, for
//! comparing builds across hosts.

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use arm_core::{FlatMemory, Machine, MachineConfig, Memory, TraceEvent, TraceSink};
use log as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

struct Fnv(u64);

impl Default for Fnv {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(0x1000_0000_01B3);
        }
    }
}

#[derive(Clone, Default)]
struct HashingSink {
    hasher: Rc<RefCell<Fnv>>,
    events: Rc<RefCell<u64>>,
}

impl TraceSink for HashingSink {
    fn on_event(&mut self, event: TraceEvent) {
        event.hash(&mut *self.hasher.borrow_mut());
        *self.events.borrow_mut() += 1;
    }
}

fn fingerprint() -> String {
    let mut memory = FlatMemory::new(0x1_0000);
    memory.load_words(
        0x100,
        &[
            0xE3A0_0001, // MOV r0, #1
            0xE1A0_1200, // MOV r1, r0, LSL #4
            0xE081_2000, // ADD r2, r1, r0
            0xE3A0_3B01, // MOV r3, #0x400
            0xE583_2000, // STR r2, [r3]
            0xE5D3_4000, // LDRB r4, [r3]
            0xEAFF_FFFE, // B .
        ],
    );

    let mut config = MachineConfig::default();
    config.core.entry_point = 0x100;
    config.core.tracing_enabled = true;
    let frame = config.video.frame_ticks();

    let sink = HashingSink::default();
    let mut machine = Machine::new(config, memory);
    machine.set_trace_sink(Box::new(sink.clone()));
    let elapsed = match machine.run_for(frame) {
        Ok(elapsed) => elapsed,
        Err(fault) => return format!("fault: {fault}"),
    };

    let mut hash = Fnv::default();
    machine.cpu().registers().hash(&mut hash);
    machine.cpu().get_cpsr().hash(&mut hash);
    machine.video().scanline().hash(&mut hash);
    machine.video().frames().hash(&mut hash);
    elapsed.hash(&mut hash);
    machine.memory_mut().read32(0x400).hash(&mut hash);
    sink.hasher.borrow().finish().hash(&mut hash);

    format!(
        "{:016x} ({} trace events, {elapsed} ticks)",
        hash.finish(),
        sink.events.borrow()
    )
}

fn main() {
    println!("{}", fingerprint());
}
