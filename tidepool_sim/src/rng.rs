// Deterministic pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding —
// hand-rolled, zero external dependencies, identical output on every
// platform. The sim owns exactly one `OverlayRng`; every random decision
// (launch jitter, particle sizing, palette picks, spawn positions) draws
// from it, so a seeded sim replays the same visual chaos.
//
// The generator state serializes with the rest of the sim, so a save/load
// cycle continues the same sequence.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG — the sim's sole source of randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverlayRng {
    s: [u64; 4],
}

impl OverlayRng {
    /// Create a new PRNG seeded from a `u64`, expanded to the 256-bit
    /// internal state via SplitMix64.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f32` in [0, 1). Upper 24 bits fill the f32 mantissa.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform value in `[low, high)`. Equal or inverted bounds return
    /// `low` — a degenerate range from config is a fixed value, not a
    /// panic.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        low + self.next_f32() * (high - low)
    }

    /// Uniform angle in `[-arc, arc]` radians — the launch-direction jitter
    /// used by the squid and splash spawners (±45° in the default config).
    pub fn jitter_arc(&mut self, arc: f32) -> f32 {
        if arc <= 0.0 {
            return 0.0;
        }
        self.range_f32(-arc, arc)
    }

    /// Pick a uniformly random element of a slice. `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next_u64() % items.len() as u64) as usize;
        Some(&items[idx])
    }

    /// Uniform `u8` in `[low, high]` (inclusive). Inverted bounds return
    /// `low`, same as `range_f32`.
    pub fn range_u8_inclusive(&mut self, low: u8, high: u8) -> u8 {
        if high <= low {
            return low;
        }
        let span = (high - low) as u64 + 1;
        low + (self.next_u64() % span) as u8
    }
}

/// SplitMix64 — the xoshiro authors' recommended seed expander.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
