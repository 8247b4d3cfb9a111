//! Injectable randomness for the scorer's jitter rule and display sampling

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The only source of non-determinism the scorer consumes.
pub trait RandomSource {
    /// Next float in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }

    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}

/// Adapter over any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Reproducible source for tests and replayable demos
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays scripted values, cycling when exhausted.
///
/// An empty float script always yields `0.999`; an empty index script
/// always yields `0`.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    floats: Vec<f64>,
    indices: Vec<usize>,
    float_pos: usize,
    index_pos: usize,
}

impl SequenceSource {
    pub fn new(floats: Vec<f64>, indices: Vec<usize>) -> Self {
        Self {
            floats,
            indices,
            float_pos: 0,
            index_pos: 0,
        }
    }

    /// Never rolls under any probability below one
    pub fn jitter_off() -> Self {
        Self::new(vec![0.999], vec![0])
    }

    /// Always rolls under any positive probability
    pub fn jitter_on() -> Self {
        Self::new(vec![0.0], vec![0])
    }
}

impl RandomSource for SequenceSource {
    fn next_f64(&mut self) -> f64 {
        if self.floats.is_empty() {
            return 0.999;
        }
        let value = self.floats[self.float_pos % self.floats.len()];
        self.float_pos += 1;
        value
    }

    fn pick(&mut self, len: usize) -> usize {
        if self.indices.is_empty() {
            return 0;
        }
        let value = self.indices[self.index_pos % self.indices.len()];
        self.index_pos += 1;
        value % len
    }
}
