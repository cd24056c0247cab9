//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the simulator MUST go through a [`RandomSource`].
//!
//! The day step only ever sees `&mut dyn RandomSource`, so tests can swap the
//! seeded generator for a [`ScriptedRandom`] and pin every draw.

mod scripted;
mod xorshift;

pub use scripted::ScriptedRandom;
pub use xorshift::RngManager;

/// Source of randomness consumed by the simulation
///
/// Only `next_f64` and `pick` are required by the simulation; both have
/// straightforward implementations for stubs.
pub trait RandomSource {
    /// Uniform draw in `[0.0, 1.0)`
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `[0, len)`
    ///
    /// # Panics
    /// Implementations may panic when `len == 0`.
    fn pick(&mut self, len: usize) -> usize;

    /// Bernoulli trial with success probability `p`
    fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.next_f64() < p
    }
}
