//! Scripted random source for tests and replays

use super::RandomSource;
use std::collections::VecDeque;

/// Random source that replays a fixed script of draws
///
/// Floats and indices are kept in separate queues. When a queue runs dry the
/// fallback value is returned (`1.0 - f64::EPSILON` for floats, so every
/// `chance(p < 1)` fails, and `0` for indices).
///
/// # Example
/// ```
/// use fleet_induction_core::rng::{RandomSource, ScriptedRandom};
///
/// let mut rng = ScriptedRandom::new().with_floats([0.05]).with_picks([2]);
/// assert!(rng.chance(0.1));
/// assert_eq!(rng.pick(3), 2);
/// assert!(!rng.chance(0.9));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    floats: VecDeque<f64>,
    picks: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floats(mut self, floats: impl IntoIterator<Item = f64>) -> Self {
        self.floats.extend(floats);
        self
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Draws still queued (floats, picks)
    pub fn remaining(&self) -> (usize, usize) {
        (self.floats.len(), self.picks.len())
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.floats.pop_front().unwrap_or(1.0 - f64::EPSILON)
    }

    fn pick(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty set");
        self.picks.pop_front().map(|i| i % len).unwrap_or(0)
    }
}
