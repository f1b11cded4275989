//! The per-region sampling loop.
//!
//! Each region gets a fixed attempt budget. An attempt draws a coordinate,
//! resolves the nearest panorama (primary radius, then one wider fallback),
//! renders every configured heading in a shuffled order, keeps the best
//! scoring view and persists it if it clears the acceptance threshold. The
//! first accepted view ends the region.

mod outcome;
mod params;
mod sampler;
mod select;

pub use outcome::{
    AttemptOutcome, AttemptRecord, Candidate, RegionOutcome, RegionReport, RunSummary,
};
pub use params::SamplingParams;
pub use sampler::RegionSampler;
pub use select::{best_candidate, pick_better};
