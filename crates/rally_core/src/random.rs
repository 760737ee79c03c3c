//! Randomness seam for malfunction rolls.

use rand::Rng;

/// Uniform draws in `[0, 1)`, one per malfunction check.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Adapts any `rand::Rng` (typically a seeded `ChaCha8Rng`).
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling once exhausted.
///
/// An empty script always yields the largest value below 1, i.e. never a malfunction.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    rolls: Vec<f64>,
    drawn: usize,
}

const NEVER: f64 = 1.0 - f64::EPSILON;

impl ScriptedRolls {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            drawn: 0,
        }
    }

    pub fn constant(roll: f64) -> Self {
        Self::new([roll])
    }

    /// Number of draws taken so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomSource for ScriptedRolls {
    fn next_unit(&mut self) -> f64 {
        let roll = if self.rolls.is_empty() {
            NEVER
        } else {
            self.rolls[self.drawn % self.rolls.len()]
        };
        self.drawn += 1;
        roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn scripted_rolls_cycle() {
        let mut rolls = ScriptedRolls::new([0.1, 0.9]);
        let drawn: Vec<f64> = (0..5).map(|_| rolls.next_unit()).collect();
        assert_eq!(drawn, vec![0.1, 0.9, 0.1, 0.9, 0.1]);
        assert_eq!(rolls.drawn(), 5);
    }

    #[test]
    fn empty_script_never_rolls_a_malfunction() {
        let mut rolls = ScriptedRolls::default();
        assert!(rolls.next_unit() < 1.0);
        assert!(rolls.next_unit() > 0.99);
    }

    #[test]
    fn seeded_source_is_reproducible_and_in_range() {
        let mut a = RngSource::new(ChaCha8Rng::seed_from_u64(7));
        let mut b = RngSource::new(ChaCha8Rng::seed_from_u64(7));
        for _ in 0..1000 {
            let x = a.next_unit();
            assert!((0.0..1.0).contains(&x));
            assert!((x - b.next_unit()).abs() < f64::EPSILON);
        }
    }
}
