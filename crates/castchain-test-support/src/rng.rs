//! Deterministic random sources for tests.
//!
//! Sessions only draw randomness to pick the opening side, so these fakes
//! are phrased as coin flips: `0` is the host, `1` the guest.

use castchain_core::rng::DeterministicRng;

/// Always draws the lower bound. With `StartingSide::Random` the host opens.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Replays scripted flips in a loop, clamped into the requested range.
#[derive(Debug, Clone)]
pub struct CoinRng {
    flips: Vec<u32>,
    drawn: usize,
}

impl CoinRng {
    #[must_use]
    pub fn new(flips: Vec<u32>) -> Self {
        Self { flips, drawn: 0 }
    }

    /// Every random opening goes to the guest.
    #[must_use]
    pub fn guest_first() -> Self {
        Self::new(vec![1])
    }

    /// Number of flips drawn so far.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.drawn
    }
}

impl DeterministicRng for CoinRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let flip = if self.flips.is_empty() {
            min
        } else {
            self.flips[self.drawn % self.flips.len()]
        };
        self.drawn += 1;
        flip.clamp(min, max)
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}
