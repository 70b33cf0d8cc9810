/// Small seedable generator behind every `rand(...)` evaluation.
///
/// Output is a pure function of the seed, so a document executed twice with the same
/// seed produces identical effects.
#[derive(Clone, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Seed used when the caller does not pick one.
    pub const DEFAULT_SEED: u64 = 0x5EED_0F_6A6;

    /// Create a generator from `seed`.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit output.
    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform sample in `[low, high)`.
    ///
    /// Reversed bounds are accepted and sample `(high, low]`; equal bounds return `low`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64_01()
    }
}

impl Default for Rng64 {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}
