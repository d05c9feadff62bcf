//! Index Randomness Sources
//!
//! Oracle index sets and request group indexes must be outside the control
//! of oracle operators. The draw is a capability so it can be replaced by a
//! verifiable source without touching the protocol.

use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of indexes uniformly distributed over `[0, range)`.
pub trait IndexSource: Send + Sync {
    /// `context` identifies what the draw is for (an oracle identity, a
    /// flight); implementations may mix it in but must not let it select
    /// the result.
    fn draw(&self, context: &[u8], range: u16) -> u8;
}

/// Hash chain over a secret seed, a nonce and the draw context.
/// Deterministic for a given seed, unpredictable without it.
pub struct HashIndexSource {
    seed: [u8; 32],
    nonce: AtomicU64,
}

impl HashIndexSource {
    /// Seeded from the operating system RNG
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            seed,
            nonce: AtomicU64::new(0),
        }
    }
}

impl Default for HashIndexSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSource for HashIndexSource {
    fn draw(&self, context: &[u8], range: u16) -> u8 {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(nonce.to_be_bytes());
        hasher.update(context);
        let digest = hasher.finalize();

        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        // range <= 256, so the modulo bias over a u64 is negligible
        (u64::from_be_bytes(word) % u64::from(range.max(1))) as u8
    }
}

/// Thread-local RNG, for simulations
#[derive(Default)]
pub struct ThreadRngIndexSource;

impl IndexSource for ThreadRngIndexSource {
    fn draw(&self, _context: &[u8], range: u16) -> u8 {
        rand::thread_rng().gen_range(0..range.max(1)) as u8
    }
}

/// Draw `size` distinct indexes from `[0, range)`.
///
/// Requires `size <= range`. If the source keeps repeating itself the
/// remaining slots are filled by scanning upward from the last draw.
pub fn draw_index_set(
    source: &dyn IndexSource,
    context: &[u8],
    size: usize,
    range: u16,
) -> BTreeSet<u8> {
    let size = size.min(range as usize);
    let mut indexes = BTreeSet::new();
    let mut last = 0u8;

    for _ in 0..size * 64 {
        if indexes.len() == size {
            return indexes;
        }
        last = source.draw(context, range);
        indexes.insert(last);
    }

    let mut candidate = u16::from(last);
    while indexes.len() < size {
        candidate = (candidate + 1) % range;
        indexes.insert(candidate as u8);
    }
    indexes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Constant(u8);

    impl IndexSource for Constant {
        fn draw(&self, _context: &[u8], _range: u16) -> u8 {
            self.0
        }
    }

    #[test]
    fn test_seeded_source_is_deterministic() {
        let a = HashIndexSource::with_seed([7u8; 32]);
        let b = HashIndexSource::with_seed([7u8; 32]);
        let draws_a: Vec<u8> = (0..16).map(|_| a.draw(b"oracle-1", 10)).collect();
        let draws_b: Vec<u8> = (0..16).map(|_| b.draw(b"oracle-1", 10)).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().all(|i| *i < 10));
    }

    #[test]
    fn test_hash_source_covers_range() {
        let source = HashIndexSource::with_seed([1u8; 32]);
        let mut counts: HashMap<u8, usize> = HashMap::new();
        for _ in 0..2000 {
            *counts.entry(source.draw(b"ctx", 10)).or_default() += 1;
        }
        assert_eq!(counts.len(), 10);
        // Loose uniformity check: each bucket near 200
        assert!(counts.values().all(|c| *c > 120 && *c < 280));
    }

    #[test]
    fn test_index_set_is_distinct() {
        let source = HashIndexSource::with_seed([3u8; 32]);
        for i in 0..50 {
            let set = draw_index_set(&source, format!("oracle-{}", i).as_bytes(), 3, 10);
            assert_eq!(set.len(), 3);
            assert!(set.iter().all(|idx| *idx < 10));
        }
    }

    #[test]
    fn test_degenerate_source_still_fills_set() {
        let set = draw_index_set(&Constant(9), b"x", 3, 10);
        assert_eq!(set, BTreeSet::from([9, 0, 1]));
    }

    #[test]
    fn test_thread_rng_in_range() {
        let source = ThreadRngIndexSource;
        assert!((0..100).all(|_| source.draw(b"", 4) < 4));
    }
}
