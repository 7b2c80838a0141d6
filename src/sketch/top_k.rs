//! Heavy-hitter tracking over a count-min sketch

use super::hash64;

/// A ranked key with its estimated frequency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub key: String,
    pub freq: u64,
}

/// Approximate top-N frequency tracker
///
/// Every key increments a count-min sketch; the `n` keys with the highest
/// estimates are kept as candidates. Estimates never undercount, and with
/// the configured `confidence` overcount by at most `epsilon` times the
/// total number of adds.
#[derive(Debug, Clone)]
pub struct TopK {
    width: usize,
    rows: Vec<Vec<u64>>,
    n: usize,
    candidates: Vec<Element>,
}

impl TopK {
    /// Create a tracker for the `n` most frequent keys
    ///
    /// Width is `ceil(e / epsilon)` and depth `ceil(ln(1 / (1 - confidence)))`.
    #[must_use]
    pub fn new(epsilon: f64, confidence: f64, n: usize) -> Self {
        let width = (std::f64::consts::E / epsilon).ceil().max(1.0) as usize;
        let depth = (1.0 / (1.0 - confidence)).ln().ceil().max(1.0) as usize;
        Self {
            width,
            rows: vec![vec![0; width]; depth],
            n,
            candidates: Vec::with_capacity(n + 1),
        }
    }

    /// Record one occurrence of `key`
    pub fn add(&mut self, key: &str) {
        let estimate = self.increment(key.as_bytes());

        if let Some(existing) = self.candidates.iter_mut().find(|e| e.key == key) {
            existing.freq = estimate;
            return;
        }

        if self.candidates.len() < self.n {
            self.candidates.push(Element {
                key: key.to_string(),
                freq: estimate,
            });
            return;
        }

        // Replace the weakest candidate if the newcomer now beats it
        if let Some(weakest) = self.candidates.iter_mut().min_by_key(|e| e.freq)
            && estimate > weakest.freq
        {
            weakest.key = key.to_string();
            weakest.freq = estimate;
        }
    }

    /// Current estimate for `key`
    #[must_use]
    pub fn estimate(&self, key: &str) -> u64 {
        let (h1, h2) = split_hash(key.as_bytes());
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row[self.index(h1, h2, i)])
            .min()
            .unwrap_or(0)
    }

    /// Tracked keys, most frequent first (ties broken by key)
    #[must_use]
    pub fn elements(&self) -> Vec<Element> {
        let mut ranked = self.candidates.clone();
        ranked.sort_by(|a, b| b.freq.cmp(&a.freq).then_with(|| a.key.cmp(&b.key)));
        ranked
    }

    /// Maximum number of keys returned by [`elements`](Self::elements)
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.n
    }

    fn increment(&mut self, key: &[u8]) -> u64 {
        let (h1, h2) = split_hash(key);
        let mut estimate = u64::MAX;
        for i in 0..self.rows.len() {
            let idx = self.index(h1, h2, i);
            let cell = &mut self.rows[i][idx];
            *cell = cell.saturating_add(1);
            estimate = estimate.min(*cell);
        }
        estimate
    }

    #[inline]
    fn index(&self, h1: u64, h2: u64, row: usize) -> usize {
        (h1.wrapping_add((row as u64).wrapping_mul(h2)) % self.width as u64) as usize
    }
}

/// Two hash values for double hashing across rows
#[inline]
fn split_hash(key: &[u8]) -> (u64, u64) {
    let h = hash64(key);
    (h & 0xffff_ffff, (h >> 32) | 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let topk = TopK::new(0.001, 0.99, 5);
        assert_eq!(topk.width, 2719);
        assert_eq!(topk.rows.len(), 5);
        assert_eq!(topk.capacity(), 5);
    }

    #[test]
    fn test_ranks_by_frequency() {
        let mut topk = TopK::new(0.001, 0.99, 3);
        for _ in 0..10 {
            topk.add("/pages");
        }
        for _ in 0..5 {
            topk.add("/users");
        }
        topk.add("/admin");

        let elements = topk.elements();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].key, "/pages");
        assert_eq!(elements[0].freq, 10);
        assert_eq!(elements[1].key, "/users");
        assert_eq!(elements[1].freq, 5);
        assert_eq!(elements[2].key, "/admin");
        assert_eq!(elements[2].freq, 1);
    }

    #[test]
    fn test_bounded_to_n() {
        let mut topk = TopK::new(0.001, 0.99, 2);
        for key in ["/a", "/b", "/c", "/d"] {
            topk.add(key);
        }
        assert_eq!(topk.elements().len(), 2);
    }

    #[test]
    fn test_heavy_hitter_displaces_weak_candidate() {
        let mut topk = TopK::new(0.001, 0.99, 2);
        topk.add("/a");
        topk.add("/b");
        for _ in 0..4 {
            topk.add("/c");
        }

        let keys: Vec<_> = topk.elements().into_iter().map(|e| e.key).collect();
        assert_eq!(keys[0], "/c");
        assert!(keys.len() == 2);
    }

    #[test]
    fn test_estimate_never_undercounts() {
        let mut topk = TopK::new(0.01, 0.9, 1);
        for i in 0..200 {
            topk.add(&format!("/k{}", i % 20));
        }
        for i in 0..20 {
            assert!(topk.estimate(&format!("/k{i}")) >= 10);
        }
    }

    #[test]
    fn test_empty() {
        let topk = TopK::new(0.001, 0.99, 5);
        assert!(topk.elements().is_empty());
        assert_eq!(topk.estimate("/nothing"), 0);
    }
}
