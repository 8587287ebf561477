//! Property coverage for the barrel shifter, mode banking and the scheduler.

#![allow(clippy::pedantic, clippy::nursery)]

use arm_core::shifter::{shift_by_immediate, shift_by_register};
use arm_core::{ArchitecturalState, EventSource, Mode, Scheduler, ShiftKind};
use log as _;
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn any_shift_kind() -> impl Strategy<Value = ShiftKind> {
    prop_oneof![
        Just(ShiftKind::Lsl),
        Just(ShiftKind::Lsr),
        Just(ShiftKind::Asr),
        Just(ShiftKind::Ror),
    ]
}

fn noop(_: &mut (), _: &mut Scheduler<()>, _: u64) {}

proptest! {
    #[test]
    fn lsl_zero_passes_value_and_carry_through(value in any::<u32>(), carry in any::<bool>()) {
        let out = shift_by_immediate(ShiftKind::Lsl, value, 0, carry);
        prop_assert_eq!(out.value, value);
        prop_assert_eq!(out.carry, carry);
    }

    #[test]
    fn ror_zero_is_rotate_right_extended(value in any::<u32>(), carry in any::<bool>()) {
        let out = shift_by_immediate(ShiftKind::Ror, value, 0, carry);
        prop_assert_eq!(out.value, (u32::from(carry) << 31) | (value >> 1));
        prop_assert_eq!(out.carry, value & 1 != 0);
    }

    #[test]
    fn register_amount_zero_never_changes_anything(
        kind in any_shift_kind(),
        value in any::<u32>(),
        carry in any::<bool>(),
        high in 1u32..0x0100_0000,
    ) {
        // Only the low byte counts, so 0x100, 0x200, ... behave like zero.
        let out = shift_by_register(kind, value, high << 8, carry);
        prop_assert_eq!((out.value, out.carry), (value, carry));
    }

    #[test]
    fn register_amount_thirty_two(value in any::<u32>(), carry in any::<bool>()) {
        let sign = value >> 31 != 0;
        let lsl = shift_by_register(ShiftKind::Lsl, value, 32, carry);
        prop_assert_eq!((lsl.value, lsl.carry), (0, value & 1 != 0));
        let lsr = shift_by_register(ShiftKind::Lsr, value, 32, carry);
        prop_assert_eq!((lsr.value, lsr.carry), (0, sign));
        let asr = shift_by_register(ShiftKind::Asr, value, 32, carry);
        prop_assert_eq!((asr.value, asr.carry), (if sign { u32::MAX } else { 0 }, sign));
        let ror = shift_by_register(ShiftKind::Ror, value, 32, carry);
        prop_assert_eq!((ror.value, ror.carry), (value, sign));
    }

    #[test]
    fn register_amount_above_thirty_two(
        value in any::<u32>(),
        carry in any::<bool>(),
        amount in 33u32..=255,
    ) {
        let sign = value >> 31 != 0;
        let lsl = shift_by_register(ShiftKind::Lsl, value, amount, carry);
        prop_assert_eq!((lsl.value, lsl.carry), (0, false));
        let lsr = shift_by_register(ShiftKind::Lsr, value, amount, carry);
        prop_assert_eq!((lsr.value, lsr.carry), (0, false));
        let asr = shift_by_register(ShiftKind::Asr, value, amount, carry);
        prop_assert_eq!((asr.value, asr.carry), (if sign { u32::MAX } else { 0 }, sign));
        let ror = shift_by_register(ShiftKind::Ror, value, amount, carry);
        let rotate = amount % 32;
        if rotate == 0 {
            prop_assert_eq!((ror.value, ror.carry), (value, sign));
        } else {
            prop_assert_eq!(ror.value, value.rotate_right(rotate));
            prop_assert_eq!(ror.carry, (value >> (rotate - 1)) & 1 != 0);
        }
    }

    #[test]
    fn fiq_bank_survives_a_trip_through_user(
        fiq_values in proptest::array::uniform7(any::<u32>()),
        user_values in proptest::array::uniform7(any::<u32>()),
    ) {
        let mut state = ArchitecturalState::new(0, Mode::Fiq, false);
        for (offset, value) in fiq_values.iter().enumerate() {
            state.set_reg(8 + offset, *value);
        }
        state.set_mode(Mode::User);
        for (offset, value) in user_values.iter().enumerate() {
            state.set_reg(8 + offset, *value);
        }
        state.set_mode(Mode::Fiq);
        for (offset, value) in fiq_values.iter().enumerate() {
            prop_assert_eq!(state.reg(8 + offset), *value);
        }
        state.set_mode(Mode::User);
        for (offset, value) in user_values.iter().enumerate() {
            prop_assert_eq!(state.reg(8 + offset), *value);
        }
    }

    #[test]
    fn abort_banks_only_stack_and_link(
        shared in proptest::array::uniform5(any::<u32>()),
        svc_sp in any::<u32>(),
        svc_lr in any::<u32>(),
        abt_sp in any::<u32>(),
        abt_lr in any::<u32>(),
    ) {
        let mut state = ArchitecturalState::new(0, Mode::Supervisor, false);
        for (offset, value) in shared.iter().enumerate() {
            state.set_reg(8 + offset, *value);
        }
        state.set_reg(13, svc_sp);
        state.set_reg(14, svc_lr);

        state.set_mode(Mode::Abort);
        for (offset, value) in shared.iter().enumerate() {
            prop_assert_eq!(state.reg(8 + offset), *value);
        }
        state.set_reg(13, abt_sp);
        state.set_reg(14, abt_lr);

        state.set_mode(Mode::Supervisor);
        prop_assert_eq!((state.reg(13), state.reg(14)), (svc_sp, svc_lr));
        for (offset, value) in shared.iter().enumerate() {
            prop_assert_eq!(state.reg(8 + offset), *value);
        }
        state.set_mode(Mode::Abort);
        prop_assert_eq!((state.reg(13), state.reg(14)), (abt_sp, abt_lr));
    }

    #[test]
    fn rescheduling_a_source_keeps_one_event_at_the_latest_delta(
        start in 0u64..1_000_000,
        first in 0u64..100_000,
        second in 0u64..100_000,
        late in 0u64..64,
    ) {
        let mut scheduler = Scheduler::<()>::new();
        scheduler.advance(start);
        scheduler.schedule_relative(EventSource::Video, first, noop);
        scheduler.schedule_relative(EventSource::Video, second, noop);
        prop_assert_eq!(scheduler.pending_len(), 1);
        prop_assert_eq!(scheduler.due_tick(EventSource::Video), Some(start + second));

        scheduler.advance(second + late);
        let event = scheduler.pop_due_event();
        prop_assert!(event.is_some());
        if let Some(event) = event {
            prop_assert_eq!(event.fire(&mut (), &mut scheduler), late);
        }
        prop_assert!(scheduler.pop_due_event().is_none());
    }
}
