use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Complete state of a [`CityRng`], as stored in save files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RngSnapshot {
    /// Key the generator was seeded with.
    pub seed: [u8; 32],
    /// Stream selector.
    pub stream: u64,
    /// Position within the stream, in 32-bit words.
    pub word_pos: u128,
}

/// Seeded random source shared by every stochastic decision in the simulation.
///
/// Two cities seeded alike and driven by the same commands draw the same
/// values in the same order.
#[derive(Clone, Debug)]
pub struct CityRng(ChaCha8Rng);

impl CityRng {
    /// Creates a generator from a 64-bit seed.
    #[must_use]
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Restores a generator from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: RngSnapshot) -> Self {
        let mut rng = ChaCha8Rng::from_seed(snapshot.seed);
        rng.set_stream(snapshot.stream);
        rng.set_word_pos(snapshot.word_pos);
        Self(rng)
    }

    /// Captures the generator state.
    #[must_use]
    pub fn snapshot(&self) -> RngSnapshot {
        RngSnapshot {
            seed: self.0.get_seed(),
            stream: self.0.get_stream(),
            word_pos: self.0.get_word_pos(),
        }
    }

    /// Uniform value in `0..n`; zero when `n` is zero.
    pub fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.0.gen_range(0..n)
        }
    }

    /// Uniform value in `lo..=hi`.
    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            lo
        } else {
            self.0.gen_range(lo..=hi)
        }
    }

    /// True with probability one in `n`. Always true for `n` of 0 or 1.
    pub fn chance(&mut self, n: u32) -> bool {
        self.below(n) == 0
    }

    /// Uniformly chosen element, `None` for an empty slice.
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let index = self.below(u32::try_from(items.len()).unwrap_or(u32::MAX));
        items.get(index as usize).copied()
    }
}
