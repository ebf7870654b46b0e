//! Uniform integer source used by genotype operations.

use rand::prelude::*;

/// Source of uniform integers in an inclusive range.
///
/// Everything random in the crate goes through this trait, so a
/// deterministic source can stand in for tests.
pub trait UniformInt {
    /// Uniform integer in `min..=max`. Callers guarantee `min <= max`.
    fn uniform_int(&mut self, min: i32, max: i32) -> i32;
}

impl<R: UniformInt + ?Sized> UniformInt for &mut R {
    fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        (**self).uniform_int(min, max)
    }
}

/// Random number generator wrapper for genotype operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy-seeded otherwise.
    pub fn from_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::random, Self::new)
    }
}

impl UniformInt for GenomeRng {
    #[inline]
    fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        self.rng.gen_range(min..=max)
    }
}

/// Replays a fixed cycle of values, clamped into the requested range.
#[cfg(test)]
pub(crate) struct ScriptedRng {
    values: Vec<i32>,
    pos: usize,
}

#[cfg(test)]
impl ScriptedRng {
    pub(crate) fn new(values: Vec<i32>) -> Self {
        assert!(!values.is_empty());
        Self { values, pos: 0 }
    }
}

#[cfg(test)]
impl UniformInt for ScriptedRng {
    fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value.clamp(min, max)
    }
}
