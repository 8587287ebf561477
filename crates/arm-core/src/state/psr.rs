//! Program status register layout.

/// `CPSR` bit for a negative result.
pub const PSR_N: u32 = 1 << 31;
/// `CPSR` bit for a zero result.
pub const PSR_Z: u32 = 1 << 30;
/// `CPSR` bit for carry/not-borrow.
pub const PSR_C: u32 = 1 << 29;
/// `CPSR` bit for signed overflow.
pub const PSR_V: u32 = 1 << 28;
/// `CPSR` sticky saturation bit.
pub const PSR_Q: u32 = 1 << 27;
/// `CPSR` IRQ disable bit.
pub const PSR_I: u32 = 1 << 7;
/// `CPSR` FIQ disable bit.
pub const PSR_F: u32 = 1 << 6;
/// `CPSR` Thumb state bit.
pub const PSR_T: u32 = 1 << 5;
/// Mode field mask.
pub const PSR_MODE_MASK: u32 = 0x1F;

/// Byte lane holding the condition flags.
pub const PSR_FLAGS_LANE: u32 = 0xFF00_0000;
/// Byte lane holding the status field.
pub const PSR_STATUS_LANE: u32 = 0x00FF_0000;
/// Byte lane holding the extension field.
pub const PSR_EXTENSION_LANE: u32 = 0x0000_FF00;
/// Byte lane holding interrupt masks, Thumb state, and mode.
pub const PSR_CONTROL_LANE: u32 = 0x0000_00FF;

/// Named flags of the current program status register, excluding the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct StatusFlags {
    /// N: result was negative.
    pub negative: bool,
    /// Z: result was zero.
    pub zero: bool,
    /// C: carry out / not borrow / shifter carry.
    pub carry: bool,
    /// V: signed overflow.
    pub overflow: bool,
    /// Q: sticky saturation.
    pub sticky: bool,
    /// I: IRQs masked.
    pub irq_disable: bool,
    /// F: FIQs masked.
    pub fiq_disable: bool,
    /// T: executing Thumb instructions.
    pub thumb: bool,
}

impl StatusFlags {
    /// Unpacks every flag bit from a status word. The mode field is ignored.
    #[must_use]
    pub const fn from_bits(value: u32) -> Self {
        Self {
            negative: value & PSR_N != 0,
            zero: value & PSR_Z != 0,
            carry: value & PSR_C != 0,
            overflow: value & PSR_V != 0,
            sticky: value & PSR_Q != 0,
            irq_disable: value & PSR_I != 0,
            fiq_disable: value & PSR_F != 0,
            thumb: value & PSR_T != 0,
        }
    }

    /// Packs the flags into a status word with an empty mode field.
    #[must_use]
    pub const fn bits(self) -> u32 {
        let mut value = 0;
        if self.negative {
            value |= PSR_N;
        }
        if self.zero {
            value |= PSR_Z;
        }
        if self.carry {
            value |= PSR_C;
        }
        if self.overflow {
            value |= PSR_V;
        }
        if self.sticky {
            value |= PSR_Q;
        }
        if self.irq_disable {
            value |= PSR_I;
        }
        if self.fiq_disable {
            value |= PSR_F;
        }
        if self.thumb {
            value |= PSR_T;
        }
        value
    }

    /// Sets N and Z from a 32-bit result.
    pub const fn set_nz(&mut self, result: u32) {
        self.negative = result & 0x8000_0000 != 0;
        self.zero = result == 0;
    }
}

/// Builds the byte-lane write mask from the four MSR field bits.
#[must_use]
#[allow(clippy::fn_params_excessive_bools)]
pub const fn field_mask(control: bool, extension: bool, status: bool, flags: bool) -> u32 {
    let mut mask = 0;
    if control {
        mask |= PSR_CONTROL_LANE;
    }
    if extension {
        mask |= PSR_EXTENSION_LANE;
    }
    if status {
        mask |= PSR_STATUS_LANE;
    }
    if flags {
        mask |= PSR_FLAGS_LANE;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::{field_mask, StatusFlags, PSR_C, PSR_MODE_MASK, PSR_N, PSR_Q, PSR_T};

    #[test]
    fn packing_ignores_mode_and_reserved_bits() {
        let flags = StatusFlags::from_bits(0x07FF_FF1F);
        assert_eq!(flags, StatusFlags::default());
        assert_eq!(flags.bits() & PSR_MODE_MASK, 0);
    }

    #[test]
    fn every_flag_maps_to_its_own_bit() {
        let value = PSR_N | PSR_C | PSR_Q | PSR_T;
        let flags = StatusFlags::from_bits(value);
        assert!(flags.negative && flags.carry && flags.sticky && flags.thumb);
        assert!(!flags.zero && !flags.overflow && !flags.irq_disable && !flags.fiq_disable);
        assert_eq!(flags.bits(), value);
    }

    #[test]
    fn set_nz_tracks_sign_and_zero() {
        let mut flags = StatusFlags::default();
        flags.set_nz(0);
        assert!(flags.zero && !flags.negative);
        flags.set_nz(0x8000_0001);
        assert!(!flags.zero && flags.negative);
    }

    #[test]
    fn field_mask_selects_byte_lanes() {
        assert_eq!(field_mask(false, false, false, false), 0);
        assert_eq!(field_mask(true, false, false, false), 0x0000_00FF);
        assert_eq!(field_mask(false, true, false, false), 0x0000_FF00);
        assert_eq!(field_mask(false, false, true, false), 0x00FF_0000);
        assert_eq!(field_mask(false, false, false, true), 0xFF00_0000);
        assert_eq!(field_mask(true, true, true, true), u32::MAX);
    }
}
