//! Gradient noise generator.
//!
//! Improved Perlin noise over a shuffled 256-entry permutation table, with
//! fractal (multi-octave) summation normalized back to roughly [-1, 1].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Permutation table size (must be power of 2).
const PERM_SIZE: usize = 256;

/// Default number of octaves for `octave_noise` callers without a preference.
pub const DEFAULT_OCTAVES: u32 = 4;

/// Default amplitude falloff per octave.
pub const DEFAULT_PERSISTENCE: f64 = 0.5;

/// Deterministic 2D gradient noise.
///
/// The permutation table is built once at construction and never changes, so
/// every sample is a pure function of its coordinates.
#[derive(Clone)]
pub struct NoiseField {
    seed: Option<u64>,
    /// Doubled table: indices 256..512 mirror 0..256
    perm: [u8; PERM_SIZE * 2],
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl NoiseField {
    /// Create a noise field whose permutation is shuffled from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut field = Self::from_shuffle(&mut rng);
        field.seed = Some(seed);
        field
    }

    /// Create a noise field from fresh entropy.
    pub fn random() -> Self {
        Self::from_shuffle(&mut rand::thread_rng())
    }

    /// Create a noise field from an explicit permutation of 0..=255.
    ///
    /// The table is used as given; callers passing a non-permutation still
    /// get deterministic (if lower quality) noise.
    pub fn from_permutation(table: [u8; PERM_SIZE]) -> Self {
        let mut perm = [0u8; PERM_SIZE * 2];
        perm[..PERM_SIZE].copy_from_slice(&table);
        perm[PERM_SIZE..].copy_from_slice(&table);
        Self { seed: None, perm }
    }

    fn from_shuffle<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table = [0u8; PERM_SIZE];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle
        for i in (1..PERM_SIZE).rev() {
            let j = rng.gen_range(0..=i);
            table.swap(i, j);
        }

        Self::from_permutation(table)
    }

    /// Seed the table was shuffled from, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// The first half of the doubled permutation table.
    pub fn permutation(&self) -> &[u8] {
        &self.perm[..PERM_SIZE]
    }

    /// Single-octave noise at `(x, y)`, in approximately [-1, 1].
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let xf = x.floor();
        let yf = y.floor();
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;

        let x = x - xf;
        let y = y - yf;

        let u = fade(x);
        let v = fade(y);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize;
        let ab = p[a + 1] as usize;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize;
        let bb = p[b + 1] as usize;

        lerp(
            lerp(grad(p[aa], x, y), grad(p[ba], x - 1.0, y), u),
            lerp(grad(p[ab], x, y - 1.0), grad(p[bb], x - 1.0, y - 1.0), u),
            v,
        )
    }

    /// Fractal sum of `octaves` samples at doubling frequency, each scaled by
    /// `persistence` relative to the previous one and normalized by the total
    /// amplitude. Zero octaves yields 0.0.
    pub fn octave_noise(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            value += self.noise(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        if max_value > 0.0 {
            value / max_value
        } else {
            0.0
        }
    }
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// One of four diagonal gradients picked by the low two hash bits.
#[inline]
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}
