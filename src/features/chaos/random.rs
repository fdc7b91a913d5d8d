//! Injectable sources of uniform draws in `[0, 1)`.

use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Largest `f64` strictly below 1.0.
const LARGEST_BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

pub trait RandomSource: Send + Sync {
    /// Next uniform value in `[0, 1)`.
    fn next_unit(&self) -> f64;
}

/// Production source: the calling thread's own generator, so concurrent
/// requests never share or lock generator state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible source for statistical tests and benchmarks.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.random::<f64>(),
            Err(poisoned) => poisoned.into_inner().random::<f64>(),
        }
    }
}

/// Replays a fixed sequence of draws, cycling when it runs out.
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: Mutex<usize>,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() { vec![0.5] } else { values };
        Self {
            values,
            cursor: Mutex::new(0),
        }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        let mut cursor = match self.cursor.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let value = self.values[*cursor % self.values.len()];
        *cursor += 1;
        value.clamp(0.0, LARGEST_BELOW_ONE)
    }
}
