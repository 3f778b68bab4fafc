//! Deterministic key generation for blocks and mark definitions
//!
//! Keys are derived with blake3 from a per-conversion seed plus a counter,
//! so the same input always yields the same keys and no state is shared
//! between conversions.

// =============================================================================
// StableHasher
// =============================================================================

/// Chained blake3 digest truncated to a `u64`; identical across runs.
pub(crate) struct StableHasher(blake3::Hasher);

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self(blake3::Hasher::new())
    }

    pub(crate) fn update_str(mut self, s: &str) -> Self {
        self.0.update(s.as_bytes());
        self
    }

    pub(crate) fn update_u64(mut self, v: u64) -> Self {
        self.0.update(&v.to_le_bytes());
        self
    }

    pub(crate) fn finish(self) -> u64 {
        let digest = self.0.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }
}

// =============================================================================
// KeyGenerator
// =============================================================================

/// Source of `_key` values for one conversion.
pub trait KeyGenerator {
    /// Produce the next key. Keys must be unique within one conversion.
    fn generate(&mut self) -> String;
}

/// Length of generated keys, in hex characters
pub const KEY_LENGTH: usize = 12;

/// Counter-based blake3 keys seeded from the input
#[derive(Debug, Clone)]
pub struct StableKeys {
    seed: u64,
    counter: u64,
}

impl StableKeys {
    /// Seed from the raw HTML being converted
    pub fn for_input(html: &str) -> Self {
        Self::from_seed(StableHasher::new().update_str("__html__").update_str(html).finish())
    }

    /// Seed from a raw value
    pub const fn from_seed(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }
}

impl KeyGenerator for StableKeys {
    fn generate(&mut self) -> String {
        let value = StableHasher::new()
            .update_u64(self.seed)
            .update_u64(self.counter)
            .finish();
        self.counter += 1;
        let mut key = format!("{value:016x}");
        key.truncate(KEY_LENGTH);
        key
    }
}

impl<F> KeyGenerator for F
where
    F: FnMut() -> String,
{
    fn generate(&mut self) -> String {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_stable_hasher_is_deterministic() {
        let a = StableHasher::new().update_str("abc").update_u64(1).finish();
        let b = StableHasher::new().update_str("abc").update_u64(1).finish();
        let c = StableHasher::new().update_str("abc").update_u64(2).finish();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_stable_keys_shape_and_uniqueness() {
        let mut keys = StableKeys::for_input("<p>x</p>");
        let generated: Vec<String> = (0..200).map(|_| keys.generate()).collect();
        assert!(generated.iter().all(|k| k.len() == KEY_LENGTH));
        assert!(generated.iter().all(|k| k.chars().all(|c| c.is_ascii_hexdigit())));
        let unique: FxHashSet<_> = generated.iter().collect();
        assert_eq!(unique.len(), generated.len());
    }

    #[test]
    fn test_same_input_same_keys() {
        let mut a = StableKeys::for_input("<p>x</p>");
        let mut b = StableKeys::for_input("<p>x</p>");
        let mut c = StableKeys::for_input("<p>y</p>");
        let first = a.generate();
        assert_eq!(first, b.generate());
        assert_ne!(first, c.generate());
    }

    #[test]
    fn test_closure_generator() {
        let mut n = 0;
        let mut keys = move || {
            n += 1;
            format!("k{n}")
        };
        assert_eq!(KeyGenerator::generate(&mut keys), "k1");
        assert_eq!(KeyGenerator::generate(&mut keys), "k2");
    }
}
