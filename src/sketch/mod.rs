//! Bounded-memory approximate aggregates
//!
//! The collector only relies on the capability traits defined here:
//!
//! - [`FrequencySketch`]: ranked heavy hitters, implemented by [`TopK`]
//! - [`CardinalityEstimator`]: distinct counts, implemented by [`HyperLogLog`]
//! - [`DistributionEstimator`]: rotating value distributions, implemented by
//!   [`WindowedHistogram`]
//!
//! None of these ever fail on `add`; they trade exactness for fixed memory.

mod histogram;
mod hyperloglog;
mod top_k;

pub use histogram::WindowedHistogram;
pub use hyperloglog::HyperLogLog;
pub use top_k::{Element, TopK};

use hdrhistogram::Histogram;
use std::fmt::Debug;
use std::hash::{DefaultHasher, Hasher};

/// Approximate frequency ranking of string keys
pub trait FrequencySketch: Debug + Send + Sync {
    fn add(&mut self, key: &str);

    /// Tracked keys ordered by estimated frequency, highest first
    fn elements(&self) -> Vec<Element>;
}

/// Approximate distinct key counter
pub trait CardinalityEstimator: Debug + Send + Sync {
    fn add(&mut self, key: &[u8]);
    fn count(&self) -> u64;
}

/// Value distribution with a rotating active bucket
pub trait DistributionEstimator: Debug + Send + Sync {
    fn record(&mut self, value: u64);

    /// Retire the active bucket and start a new one
    fn rotate(&mut self);

    /// Combined view over every retained bucket
    fn merge(&self) -> Histogram<u64>;

    /// Values recorded into the active bucket
    fn current_len(&self) -> u64;
}

impl FrequencySketch for TopK {
    fn add(&mut self, key: &str) {
        Self::add(self, key);
    }

    fn elements(&self) -> Vec<Element> {
        Self::elements(self)
    }
}

impl CardinalityEstimator for HyperLogLog {
    fn add(&mut self, key: &[u8]) {
        Self::add(self, key);
    }

    fn count(&self) -> u64 {
        Self::count(self)
    }
}

impl DistributionEstimator for WindowedHistogram {
    fn record(&mut self, value: u64) {
        Self::record(self, value);
    }

    fn rotate(&mut self) {
        Self::rotate(self);
    }

    fn merge(&self) -> Histogram<u64> {
        Self::merge(self)
    }

    fn current_len(&self) -> u64 {
        Self::current_len(self)
    }
}

/// 64-bit hash of a byte key, stable for the lifetime of the process
#[inline]
fn hash64(key: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(key);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sketches_usable_as_trait_objects() {
        let mut freq: Box<dyn FrequencySketch> = Box::new(TopK::new(0.01, 0.99, 2));
        freq.add("/a");
        freq.add("/a");
        freq.add("/b");
        let top = freq.elements();
        assert_eq!(top[0].key, "/a");
        assert_eq!(top[0].freq, 2);

        let mut distinct: Box<dyn CardinalityEstimator> = Box::new(HyperLogLog::with_precision(10));
        distinct.add(b"10.0.0.1");
        distinct.add(b"10.0.0.1");
        assert_eq!(distinct.count(), 1);

        let mut sizes: Box<dyn DistributionEstimator> =
            Box::new(WindowedHistogram::new(1_000_000, 3, 2).unwrap());
        sizes.record(10);
        sizes.rotate();
        sizes.record(20);
        assert_eq!(sizes.current_len(), 1);
        assert_eq!(sizes.merge().len(), 2);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash64(b"key"), hash64(b"key"));
        assert_ne!(hash64(b"key"), hash64(b"other"));
    }
}
