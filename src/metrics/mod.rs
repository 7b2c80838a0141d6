//! Real-time traffic statistics
//!
//! The [`Collector`] owns every aggregate derived from processed records and
//! feeds hit timestamps into a [`HitRateAverager`]. Readers get owned
//! [`Summary`] copies and never touch the locks directly.

mod averager;
mod collector;
mod snapshot;
mod types;

pub use averager::{HitRateAverager, RateWindow, Slot};
pub use collector::Collector;
pub use snapshot::{SizeDistribution, Summary};
pub use types::{SectionHits, StatusFreq};
