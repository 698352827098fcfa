//! Injected randomness.
//!
//! Containers and generators never reach for a global RNG; callers hand in a
//! [`RandomSource`], typically seeded from a hardware RNG at boot.

/// A source of uniformly distributed 32-bit values.
pub trait RandomSource {
    /// Returns the next random value.
    fn next_u32(&mut self) -> u32;

    /// Returns a value in `[0, bound)`, or 0 when `bound` is 0.
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }

    /// Returns true with probability `pct / 100`.
    fn percent_chance(&mut self, pct: u8) -> bool {
        self.below(100) < pct as u32
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

/// Xorshift32 PRNG suitable for visual effects.
#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// Creates a generator; a zero seed is replaced with 1.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }
}

impl RandomSource for Xorshift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
