//! Seeded Random Number Generation
//!
//! Two layers:
//!
//! - [`DeterministicRng`]: Xorshift128+ stream. Given the same seed it produces
//!   the same sequence on every platform.
//! - [`PerturbedRng`]: bounded integers built from the decimal digits of that
//!   stream. Its output is deliberately *not* uniform; the digit shuffling gives
//!   a pattern a player can pick up on. With `inconsistent` enabled, digits are
//!   occasionally overwritten from an unseeded source, so the pattern stays
//!   loose without being solvable from the seed alone.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Base seed used when no seed is configured.
pub const DEFAULT_SEED: u64 = 6405275983374102578;

/// Deterministic PRNG using Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use quadtick::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a non-negative 63-bit value.
    #[inline]
    pub fn next_i63(&mut self) -> i64 {
        (self.next_u64() >> 1) as i64
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a per-level seed from a base seed and a level name.
///
/// Same inputs always give the same seed; different levels get
/// unrelated sequences from one configured base seed.
pub fn derive_level_seed(base_seed: u64, level: &str) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"QUADTICK_LEVEL_SEED_V1");
    hasher.update(base_seed.to_le_bytes());
    hasher.update(level.as_bytes());

    let hash = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(head)
}

// =============================================================================
// PERTURBED RNG
// =============================================================================

/// Bounded integer generator over the digits of a seeded stream.
///
/// Not synchronized. The kernel keeps it inside the world lock, so every
/// draw from a phase callback is already serialized.
#[derive(Clone, Debug)]
pub struct PerturbedRng {
    base: DeterministicRng,
    inconsistent: bool,
    noise: StdRng,
}

impl PerturbedRng {
    /// Create a generator from a seed.
    pub fn new(seed: u64, inconsistent: bool) -> Self {
        Self {
            base: DeterministicRng::new(seed),
            inconsistent,
            noise: StdRng::from_entropy(),
        }
    }

    /// Restart the seeded stream (e.g. when a new level begins).
    pub fn reseed(&mut self, seed: u64) {
        self.base = DeterministicRng::new(seed);
    }

    /// Whether noise injection is enabled.
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent
    }

    /// Toggle noise injection.
    pub fn set_inconsistent(&mut self, inconsistent: bool) {
        self.inconsistent = inconsistent;
    }

    /// Draw an integer in `[min, max]`.
    ///
    /// Arguments are swapped when `min > max`; `min == max` returns `min`
    /// without touching the stream.
    pub fn get(&mut self, min: i64, max: i64) -> i64 {
        if min == max {
            return min;
        }
        let (min, max) = if min > max { (max, min) } else { (min, max) };

        let min_len = digit_len(min);
        let max_len = digit_len(max);
        let spread = max_len.saturating_sub(min_len);

        // max_len + (max_len - min_len) + 2, never less than what is consumed below
        let wanted = (max_len as isize + (max_len as isize - min_len as isize) + 2).max(0) as usize;
        let need = wanted.max(max_len + spread + 2);

        let mut digits = self.draw_digits();
        while digits.len() < need {
            digits.extend(self.draw_digits());
        }

        if self.inconsistent {
            self.perturb(&mut digits);
        }

        let mut res = digits[..max_len].to_vec();
        let mut at = max_len;

        if spread > 0 {
            // Each trailing digit survives only if its gate digit is even.
            let extra = res.split_off(min_len);
            let gates = &digits[at..at + spread];
            at += spread;
            for (i, gate) in gates.iter().enumerate() {
                if gate % 2 == 0 {
                    res.push(extra[i]);
                }
            }
        }

        let negative = if min < 0 && max >= 0 {
            let sign = digits[at];
            at += 1;
            sign % 2 != 0
        } else {
            max < 0
        };

        let n = match std::str::from_utf8(&res).ok().and_then(|s| s.parse::<i64>().ok()) {
            Some(n) => n as i128,
            None => return min,
        };

        let step = fold_step(digits[at] as i64, min, max) as i128;

        // Fold within the range as seen from the chosen sign.
        let folded = if negative {
            -fold(n, -(max as i128), -(min as i128), step)
        } else {
            fold(n, min as i128, max as i128, step)
        };

        folded as i64
    }

    fn draw_digits(&mut self) -> Vec<u8> {
        self.base.next_i63().to_string().into_bytes()
    }

    /// Overwrite some digits with the leading digit of a fresh unseeded draw.
    fn perturb(&mut self, digits: &mut [u8]) {
        for digit in digits.iter_mut() {
            let r = self.noise.gen_range(0..=i32::MAX).to_string().into_bytes();
            if noise_gate(&r) {
                *digit = r[0];
            }
        }
    }
}

/// Parity condition over digits 1..=5 of a noise draw.
/// Draws shorter than six digits never replace anything.
fn noise_gate(r: &[u8]) -> bool {
    if r.len() < 6 {
        return false;
    }
    let even = |i: usize| r[i] % 2 == 0;
    even(1) && (((even(2) || even(3)) && (even(4) || even(5))) || even(2) || even(4))
}

/// Number of decimal digits in `|n|`.
fn digit_len(n: i64) -> usize {
    n.unsigned_abs().to_string().len()
}

/// Folding step. A non-positive raw step falls back to one derived from
/// the range magnitudes, and never below 1.
fn fold_step(raw: i64, min: i64, max: i64) -> i64 {
    let mut step = raw;
    if step <= 0 {
        let min_abs = min.saturating_abs();
        step = max.saturating_abs() - min_abs;
        if step > min_abs && min_abs >= 0 {
            step = min_abs;
        }
    }
    step.max(1)
}

/// Repeatedly subtract/add `step` until `n` is within `[lo, hi]`, then clamp.
fn fold(mut n: i128, lo: i128, hi: i128, step: i128) -> i128 {
    if n > hi {
        let k = (n - hi + step - 1) / step;
        n -= k * step;
    }
    if n < lo {
        let k = (lo - n + step - 1) / step;
        n += k * step;
    }
    n.clamp(lo, hi)
}

// =============================================================================
// TESTS
// =============================================================================
