//! HyperLogLog distinct counter

use super::hash64;

/// Lowest and highest register index widths supported
const MIN_PRECISION: u32 = 4;
const MAX_PRECISION: u32 = 18;

/// Approximate distinct-key counter using `2^p` one-byte registers
#[derive(Debug, Clone)]
pub struct HyperLogLog {
    registers: Vec<u8>,
    precision: u32,
    alpha: f64,
}

impl HyperLogLog {
    /// Create an estimator with the given target relative error
    ///
    /// The standard error of HyperLogLog is `1.04 / sqrt(m)`, so the register
    /// count is the smallest power of two satisfying the target. 0.01 gives
    /// 16384 registers.
    #[must_use]
    pub fn with_error_rate(error_rate: f64) -> Self {
        let m = (1.04 / error_rate).powi(2);
        let precision = (m.log2().ceil() as u32).clamp(MIN_PRECISION, MAX_PRECISION);
        Self::with_precision(precision)
    }

    #[must_use]
    pub fn with_precision(precision: u32) -> Self {
        let precision = precision.clamp(MIN_PRECISION, MAX_PRECISION);
        let m = 1usize << precision;
        let alpha = match m {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m as f64),
        };
        Self {
            registers: vec![0; m],
            precision,
            alpha,
        }
    }

    /// Add a key
    pub fn add(&mut self, key: &[u8]) {
        let hash = hash64(key);
        let index = (hash >> (64 - self.precision)) as usize;
        // Rank of the first set bit in the remaining 64 - p bits
        let rest = hash << self.precision;
        let max_rank = (64 - self.precision + 1) as u8;
        let rank = ((rest.leading_zeros() + 1) as u8).min(max_rank);
        if rank > self.registers[index] {
            self.registers[index] = rank;
        }
    }

    /// Estimated number of distinct keys added so far
    #[must_use]
    pub fn count(&self) -> u64 {
        let m = self.registers.len() as f64;
        let indicator: f64 = self
            .registers
            .iter()
            .map(|&r| 2.0_f64.powi(-i32::from(r)))
            .sum();
        let raw = self.alpha * m * m / indicator;

        // Linear counting for small cardinalities
        if raw <= 2.5 * m {
            let zeros = self.registers.iter().filter(|&&r| r == 0).count();
            if zeros > 0 {
                return (m * (m / zeros as f64).ln()).round() as u64;
            }
        }

        raw.round() as u64
    }

    /// Number of registers
    #[must_use]
    pub fn registers(&self) -> usize {
        self.registers.len()
    }
}
