//! xorshift64* generator
//!
//! Same seed, same sequence. A checkpointed driver stores `get_state()` and
//! resumes with `RngManager::new(state)`.

use serde::{Deserialize, Serialize};

const MULTIPLIER: u64 = 0x2545F4914F6CDD1D;

/// Seeded random source for simulation drivers
///
/// # Example
/// ```
/// use bank_ledger_core_rs::RngManager;
///
/// let mut rng = RngManager::new(7);
/// let u = rng.next_f64();
/// assert!((0.0..1.0).contains(&u));
/// let wage = rng.normal(100.0, 5.0);
/// assert!(wage.is_finite());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// A zero seed is mapped to 1 (xorshift has no zero state)
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(MULTIPLIER)
    }

    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Uniform draw in [0.0, 1.0) with 53 bits of precision
    pub fn next_f64(&mut self) -> f64 {
        (self.next() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform draw in [low, high)
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Normal draw (Box-Muller)
    ///
    /// A non-positive `std_dev` returns `mean` without consuming randomness.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        // 1 - u lies in (0, 1], keeping ln finite
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}
