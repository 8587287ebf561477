#![no_main]

use arm_core::{Cpu, CoreConfig, FlatMemory, Mode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }

    let thumb = data[0] & 1 != 0;
    let mut memory = FlatMemory::new(0x1_0000);
    memory.load(0, &data[1..]);

    let mut cpu = Cpu::new(&CoreConfig {
        entry_point: 0,
        initial_mode: Mode::Supervisor,
        start_in_thumb: thumb,
        tracing_enabled: false,
    });
    for (index, chunk) in data[1..].chunks(4).enumerate() {
        if let [a, b, c, d] = *chunk {
            cpu.arm_set_reg(index % 15, u32::from_le_bytes([a, b, c, d]));
        }
    }
    cpu.state_mut().set_pc(0);

    for _ in 0..64 {
        let before = cpu.state().clone();
        if cpu.step(&mut memory).is_err() {
            assert_eq!(cpu.state(), &before, "faulting step mutated state");
            break;
        }
    }
});
