//! Mine placement policies for randomly generated grids.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Decides, cell by cell, whether a freshly generated grid holds a mine.
///
/// Cells are visited once each in row-major order.
pub trait MinePolicy {
    fn is_mined(&mut self, x: u32, y: u32) -> bool;
}

impl<F> MinePolicy for F
where
    F: FnMut(u32, u32) -> bool,
{
    fn is_mined(&mut self, x: u32, y: u32) -> bool {
        self(x, y)
    }
}

/// Places each mine independently with a fixed probability.
#[derive(Debug, Clone)]
pub struct RandomMines {
    probability: f64,
    rng: SmallRng,
}

impl RandomMines {
    /// Deterministic placement: the same seed yields the same layout.
    pub fn new(probability: f64, seed: u64) -> Self {
        Self {
            probability: clamp_probability(probability),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Placement seeded from the operating system.
    pub fn from_entropy(probability: f64) -> Self {
        Self {
            probability: clamp_probability(probability),
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl MinePolicy for RandomMines {
    fn is_mined(&mut self, _x: u32, _y: u32) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Never places a mine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMines;

impl MinePolicy for NoMines {
    fn is_mined(&mut self, _x: u32, _y: u32) -> bool {
        false
    }
}

fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}
