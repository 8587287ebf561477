//! Memory interface consumed by the core, plus a flat reference backing store.

/// Alignment policy helpers for data accesses.
pub mod access;

pub use access::{force_word_alignment, validate_word_alignment, WORD_ACCESS_BYTES};

/// Byte-addressed, little-endian memory seen by the CPU.
///
/// The core never interprets address ranges; implementations decide what an
/// address maps to. Reads always return a value.
pub trait Memory {
    /// Reads one byte.
    fn read8(&mut self, address: u32) -> u8;
    /// Reads a halfword.
    fn read16(&mut self, address: u32) -> u16;
    /// Reads a word.
    fn read32(&mut self, address: u32) -> u32;
    /// Writes one byte.
    fn write8(&mut self, address: u32, value: u8);
    /// Writes a halfword.
    fn write16(&mut self, address: u32, value: u16);
    /// Writes a word.
    fn write32(&mut self, address: u32, value: u32);
}

/// Default size of a [`FlatMemory`] (16 MiB).
pub const DEFAULT_FLAT_MEMORY_BYTES: usize = 1 << 24;

/// Zero-initialised little-endian byte array whose addresses wrap at its size.
#[derive(Clone, PartialEq, Eq)]
pub struct FlatMemory {
    bytes: Box<[u8]>,
}

impl std::fmt::Debug for FlatMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatMemory")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new(DEFAULT_FLAT_MEMORY_BYTES)
    }
}

impl FlatMemory {
    /// Allocates `len` zeroed bytes. A zero length is rounded up to one byte.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![0; len.max(1)].into_boxed_slice(),
        }
    }

    /// Backing size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; the store holds at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copies `data` in starting at `address`, wrapping like every other access.
    pub fn load(&mut self, address: u32, data: &[u8]) {
        let mut cursor = address;
        for byte in data {
            self.write8(cursor, *byte);
            cursor = cursor.wrapping_add(1);
        }
    }

    /// Writes consecutive little-endian ARM words starting at `address`.
    pub fn load_words(&mut self, address: u32, words: &[u32]) {
        let mut cursor = address;
        for word in words {
            self.write32(cursor, *word);
            cursor = cursor.wrapping_add(4);
        }
    }

    /// Writes consecutive little-endian Thumb halfwords starting at `address`.
    pub fn load_halfwords(&mut self, address: u32, halfwords: &[u16]) {
        let mut cursor = address;
        for halfword in halfwords {
            self.write16(cursor, *halfword);
            cursor = cursor.wrapping_add(2);
        }
    }

    fn index(&self, address: u32) -> usize {
        usize::try_from(address).map_or(0, |address| address % self.bytes.len())
    }
}

impl Memory for FlatMemory {
    fn read8(&mut self, address: u32) -> u8 {
        self.bytes[self.index(address)]
    }

    fn read16(&mut self, address: u32) -> u16 {
        u16::from_le_bytes([self.read8(address), self.read8(address.wrapping_add(1))])
    }

    fn read32(&mut self, address: u32) -> u32 {
        let low = self.read16(address);
        let high = self.read16(address.wrapping_add(2));
        u32::from(low) | (u32::from(high) << 16)
    }

    fn write8(&mut self, address: u32, value: u8) {
        let index = self.index(address);
        self.bytes[index] = value;
    }

    fn write16(&mut self, address: u32, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write8(address, low);
        self.write8(address.wrapping_add(1), high);
    }

    fn write32(&mut self, address: u32, value: u32) {
        for (offset, byte) in (0u32..).zip(value.to_le_bytes()) {
            self.write8(address.wrapping_add(offset), byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FlatMemory, Memory};

    #[test]
    fn accesses_are_little_endian() {
        let mut memory = FlatMemory::new(64);
        memory.write32(0x10, 0x1122_3344);
        assert_eq!(memory.read8(0x10), 0x44);
        assert_eq!(memory.read16(0x12), 0x1122);
        assert_eq!(memory.read32(0x10), 0x1122_3344);
    }

    #[test]
    fn addresses_wrap_at_backing_size() {
        let mut memory = FlatMemory::new(16);
        memory.write8(0x0800_0003, 0xAB);
        assert_eq!(memory.read8(3), 0xAB);
        memory.write16(15, 0xBEEF);
        assert_eq!(memory.read8(15), 0xEF);
        assert_eq!(memory.read8(0), 0xBE);
    }

    #[test]
    fn program_loaders_lay_out_consecutive_units() {
        let mut memory = FlatMemory::new(32);
        memory.load_words(0, &[0xE3A0_0001, 0xEAFF_FFFE]);
        memory.load_halfwords(8, &[0x4801, 0x0048]);
        memory.load(12, &[1, 2]);
        assert_eq!(memory.read32(4), 0xEAFF_FFFE);
        assert_eq!(memory.read16(10), 0x0048);
        assert_eq!(memory.read16(12), 0x0201);
        assert!(!memory.is_empty());
    }
}
