//! The hash operation used to pick a key's starting slot

use std::hash::{BuildHasherDefault, DefaultHasher, Hasher};

/// Hash builder used when none is supplied.
///
/// `DefaultHasher::new()` is keyed with fixed zeros, so slot placement and the
/// rendered order of a table are the same from run to run.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// Hash builder producing [`IdentityHasher`]s
pub type BuildIdentityHasher = BuildHasherDefault<IdentityHasher>;

/// FNV-1a 64-bit prime, also used to mix successive writes
const MIX_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A hasher under which an integer key hashes to its own value.
///
/// Each write first multiplies the running state, then xors in the new word,
/// so a single integer write starting from zero leaves exactly that integer.
/// Byte slices are folded in one byte at a time. Useful when a test or a demo
/// needs to know which slot a key starts probing from.
///
/// ```rust
/// use std::hash::BuildHasher;
/// use probing_table::BuildIdentityHasher;
///
/// assert_eq!(BuildIdentityHasher::default().hash_one(17_u64), 17);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHasher {
    /// Running hash state
    state: u64,
}

impl IdentityHasher {
    /// Folds one word into the state
    fn mix(&mut self, word: u64) {
        self.state = self.state.wrapping_mul(MIX_PRIME) ^ word;
    }
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.mix(u64::from(byte));
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.mix(u64::from(i));
    }

    fn write_u16(&mut self, i: u16) {
        self.mix(u64::from(i));
    }

    fn write_u32(&mut self, i: u32) {
        self.mix(u64::from(i));
    }

    fn write_u64(&mut self, i: u64) {
        self.mix(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.mix(u64::try_from(i).unwrap_or(u64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::BuildHasher;

    #[test]
    fn test_integers_hash_to_themselves() {
        let builder = BuildIdentityHasher::default();
        assert_eq!(builder.hash_one(0_u64), 0);
        assert_eq!(builder.hash_one(42_u32), 42);
        assert_eq!(builder.hash_one(7_usize), 7);
        assert_eq!(builder.hash_one(true), 1);
        assert_eq!(builder.hash_one(-1_i64), u64::MAX);
    }

    #[test]
    fn test_strings_are_spread() {
        let builder = BuildIdentityHasher::default();
        assert_ne!(builder.hash_one("ab"), builder.hash_one("ba"));
    }

    #[test]
    fn test_default_builder_is_deterministic() {
        let first = DefaultHashBuilder::default().hash_one("hello");
        let second = DefaultHashBuilder::default().hash_one("hello");
        assert_eq!(first, second);
    }
}
