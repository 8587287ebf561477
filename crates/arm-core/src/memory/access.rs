//! Alignment policy for data memory accesses.

use crate::fault::Fault;

/// Byte width of a word access.
pub const WORD_ACCESS_BYTES: u32 = 4;

/// Validates alignment for word loads.
///
/// # Errors
///
/// Returns [`Fault::Alignment`] when `address` is not a multiple of four.
pub const fn validate_word_alignment(address: u32) -> Result<(), Fault> {
    if address & (WORD_ACCESS_BYTES - 1) == 0 {
        Ok(())
    } else {
        Err(Fault::Alignment { address })
    }
}

/// Rounds a word-store address down to its containing word.
#[must_use]
pub const fn force_word_alignment(address: u32) -> u32 {
    address & !(WORD_ACCESS_BYTES - 1)
}
