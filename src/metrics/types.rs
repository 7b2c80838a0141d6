//! Value types shared by the collector and snapshots

/// Responses counted per HTTP status class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFreq {
    pub informational: u64,
    pub successful: u64,
    pub redirection: u64,
    pub client_error: u64,
    pub server_error: u64,
}

impl StatusFreq {
    /// Count `status` in its class; codes outside 100..=599 are ignored
    ///
    /// Returns whether the code was counted.
    pub fn record(&mut self, status: u16) -> bool {
        let bucket = match status {
            100..=199 => &mut self.informational,
            200..=299 => &mut self.successful,
            300..=399 => &mut self.redirection,
            400..=499 => &mut self.client_error,
            500..=599 => &mut self.server_error,
            _ => return false,
        };
        *bucket += 1;
        true
    }

    /// Sum across all five classes
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.informational
            + self.successful
            + self.redirection
            + self.client_error
            + self.server_error
    }
}

/// A section with its estimated hit count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHits {
    pub section: String,
    pub hits: u64,
}

impl From<crate::sketch::Element> for SectionHits {
    fn from(element: crate::sketch::Element) -> Self {
        Self {
            section: element.key,
            hits: element.freq,
        }
    }
}
