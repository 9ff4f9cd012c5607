#![forbid(unsafe_code)]

//! Deterministic noise source.
//!
//! [`Xorshift`] is a 128-bit xorshift generator; [`PerlinNoise`] builds a
//! permutation table from it once and then answers `noise2d` queries as a
//! pure function of its input.
//!
//! # Determinism
//!
//! Two instances built from the same seed produce bit-identical sequences and
//! noise fields on every platform. Only [`PerlinNoise::from_clock`] and
//! [`Xorshift::from_clock`] reach outside the process (wall clock).

use web_time::{SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// Xorshift
// ---------------------------------------------------------------------------

const XS_X: u32 = 123_456_789;
const XS_Y: u32 = 362_436_069;
const XS_Z: u32 = 521_288_629;
const XS_W: u32 = 88_675_123;

/// 128-bit xorshift PRNG.
///
/// A zero seed leaves the canonical state untouched, so `Xorshift::new(0)`
/// yields the reference sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xorshift {
    x: u32,
    y: u32,
    z: u32,
    w: u32,
}

impl Xorshift {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            x: XS_X ^ seed,
            y: XS_Y ^ seed,
            z: XS_Z ^ seed,
            w: XS_W ^ seed,
        }
    }

    /// Seed from the wall clock (milliseconds since the epoch, truncated).
    #[must_use]
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let t = self.x ^ (self.x << 11);
        self.x = self.y;
        self.y = self.z;
        self.z = self.w;
        self.w = (self.w ^ (self.w >> 19)) ^ (t ^ (t >> 8));
        self.w
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform integer in `[0, n)`. Returns 0 when `n == 0`.
    #[inline]
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.next_f64() * n as f64) as usize).min(n - 1)
    }

    /// Uniform integer in `[min, max]` (inclusive). Swapped bounds are
    /// reordered.
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = i64::from(hi) - i64::from(lo) + 1;
        let pick = (self.next_f64() * span as f64).floor() as i64;
        (i64::from(lo) + pick.min(span - 1)) as i32
    }

    /// `true` with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl Default for Xorshift {
    fn default() -> Self {
        Self::new(0)
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Perlin
// ---------------------------------------------------------------------------

/// Gradient directions (x, y components of the classic 3D set).
const GRAD3: [[f64; 2]; 12] = [
    [1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [0.0, 1.0],
    [0.0, -1.0],
];

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
#[must_use]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn mix(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

/// Seeded 2D gradient noise.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    perm: [u8; 512],
    seed: u32,
}

impl PerlinNoise {
    /// Build the permutation table from `seed`.
    ///
    /// The table draws 256 entries independently from the PRNG (it is not a
    /// shuffle) and then repeats them to avoid index wrapping.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        let mut rng = Xorshift::new(seed);
        let mut perm = [0u8; 512];
        for i in 0..256 {
            let v = (rng.next_f64() * 256.0) as u8;
            perm[i] = v;
            perm[i + 256] = v;
        }
        Self { perm, seed }
    }

    /// Seed from the wall clock.
    #[must_use]
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }

    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    fn corner(&self, xi: usize, yi: usize, dx: f64, dy: f64) -> f64 {
        let g = GRAD3[usize::from(self.perm[xi + usize::from(self.perm[yi])]) % 12];
        g[0] * dx + g[1] * dy
    }

    /// Sample the noise field at `(x, y)`.
    ///
    /// Output is clamped to `[-1, 1]`. Non-finite input samples as 0.
    #[must_use]
    pub fn noise2d(&self, x: f64, y: f64) -> f64 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }
        let fx = x.floor();
        let fy = y.floor();
        let xi = (fx as i64 & 255) as usize;
        let yi = (fy as i64 & 255) as usize;
        let x = x - fx;
        let y = y - fy;

        let n00 = self.corner(xi, yi, x, y);
        let n01 = self.corner(xi, yi + 1, x, y - 1.0);
        let n10 = self.corner(xi + 1, yi, x - 1.0, y);
        let n11 = self.corner(xi + 1, yi + 1, x - 1.0, y - 1.0);

        let u = fade(x);
        let v = fade(y);
        let nx0 = mix(n00, n10, u);
        let nx1 = mix(n01, n11, u);
        mix(nx0, nx1, v).clamp(-1.0, 1.0)
    }

    /// Octave sum of [`noise2d`](Self::noise2d), normalized to `[-1, 1]`.
    ///
    /// Each octave doubles the frequency and halves the amplitude.
    #[must_use]
    pub fn fractal2d(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let octaves = octaves.max(1);
        let mut sum = 0.0;
        let mut norm = 0.0;
        let mut amp = 1.0;
        let mut freq = 1.0;
        for _ in 0..octaves {
            sum += self.noise2d(x * freq, y * freq) * amp;
            norm += amp;
            amp *= 0.5;
            freq *= 2.0;
        }
        (sum / norm).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xorshift_reference_sequence() {
        // First outputs of the canonical xorshift128 state.
        let mut rng = Xorshift::new(0);
        assert_eq!(rng.next_u32(), 3_701_687_786);
        assert_eq!(rng.next_u32(), 458_299_110);
        assert_eq!(rng.next_u32(), 2_500_872_618);
    }

    #[test]
    fn xorshift_seed_changes_stream() {
        let mut a = Xorshift::new(1);
        let mut b = Xorshift::new(2);
        let sa: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let sb: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(sa, sb);
    }

    #[test]
    fn next_f64_in_unit_interval() {
        let mut rng = Xorshift::new(99);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn range_i32_is_inclusive() {
        let mut rng = Xorshift::new(7);
        let mut seen = [false; 6];
        for _ in 0..2_000 {
            let v = rng.range_i32(-1, 4);
            assert!((-1..=4).contains(&v));
            seen[(v + 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "every value hit: {seen:?}");
    }

    #[test]
    fn below_handles_zero() {
        let mut rng = Xorshift::new(3);
        assert_eq!(rng.below(0), 0);
        for _ in 0..100 {
            assert!(rng.below(5) < 5);
        }
    }

    #[test]
    fn fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert_eq!(fade(0.5), 0.5);
    }

    #[test]
    fn noise_is_zero_on_lattice() {
        let n = PerlinNoise::new(42);
        for i in -4..4 {
            for j in -4..4 {
                assert_eq!(n.noise2d(f64::from(i), f64::from(j)), 0.0);
            }
        }
    }

    #[test]
    fn noise_deterministic_per_seed() {
        let a = PerlinNoise::new(1234);
        let b = PerlinNoise::new(1234);
        for k in 0..200 {
            let x = f64::from(k) * 0.173 - 7.0;
            let y = f64::from(k) * 0.091 + 3.3;
            assert_eq!(a.noise2d(x, y).to_bits(), b.noise2d(x, y).to_bits());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = PerlinNoise::new(1);
        let b = PerlinNoise::new(2);
        let differs = (0..64).any(|k| {
            let x = f64::from(k) * 0.37 + 0.11;
            a.noise2d(x, 0.5) != b.noise2d(x, 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn noise_handles_negative_and_non_finite() {
        let n = PerlinNoise::new(5);
        let v = n.noise2d(-123.45, -0.5);
        assert!((-1.0..=1.0).contains(&v));
        assert_eq!(n.noise2d(f64::NAN, 1.0), 0.0);
        assert_eq!(n.noise2d(1.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn fractal_in_range() {
        let n = PerlinNoise::new(10);
        for k in 0..500 {
            let v = n.fractal2d(f64::from(k) * 0.02, f64::from(k) * 0.013, 3);
            assert!((-1.0..=1.0).contains(&v));
        }
    }
}
