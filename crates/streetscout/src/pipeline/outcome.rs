use std::path::PathBuf;

use image::RgbImage;
use streetscout_core::Coordinate;

use crate::provider::PanoramaId;

/// One fetched and scored view.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub heading_deg: f64,
    pub image: RgbImage,
    pub score: f32,
}

/// What a single attempt (one sampled coordinate) ended in.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    /// Neither the primary nor the fallback radius found a panorama.
    NoPanorama,
    /// A panorama was found but no heading produced an image.
    NoImagery { pano: PanoramaId },
    /// The best view scored below the acceptance threshold.
    BelowThreshold {
        pano: PanoramaId,
        heading_deg: f64,
        score: f32,
    },
    /// The best view cleared the threshold and was persisted.
    Accepted {
        pano: PanoramaId,
        heading_deg: f64,
        score: f32,
        path: PathBuf,
    },
}

/// Trace of one attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptRecord {
    pub coordinate: Coordinate,
    /// Search radius that resolved the panorama, if any did.
    pub radius_m: Option<u32>,
    /// Heading visit order used for this attempt; empty when nothing resolved.
    pub heading_order: Vec<f64>,
    pub outcome: AttemptOutcome,
}

/// Final state of a region.
#[derive(Clone, Debug, PartialEq)]
pub enum RegionOutcome {
    Accepted {
        coordinate: Coordinate,
        heading_deg: f64,
        score: f32,
        path: PathBuf,
    },
    /// Attempt budget used up without an acceptable view.
    Exhausted,
}

/// Everything that happened while sampling one region.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionReport {
    pub region: String,
    pub city: String,
    pub attempts: Vec<AttemptRecord>,
    pub outcome: RegionOutcome,
}

impl RegionReport {
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, RegionOutcome::Accepted { .. })
    }

    /// Best score among attempts that got as far as scoring.
    pub fn best_score(&self) -> Option<f32> {
        self.attempts
            .iter()
            .filter_map(|a| match a.outcome {
                AttemptOutcome::BelowThreshold { score, .. }
                | AttemptOutcome::Accepted { score, .. } => Some(score),
                _ => None,
            })
            .fold(None, |best: Option<f32>, s| Some(best.map_or(s, |b| b.max(s))))
    }
}

/// Per-run roll-up of region reports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub regions: Vec<RegionReport>,
}

impl RunSummary {
    pub fn accepted(&self) -> usize {
        self.regions.iter().filter(|r| r.is_accepted()).count()
    }

    pub fn exhausted(&self) -> usize {
        self.regions.len() - self.accepted()
    }

    pub fn written_paths(&self) -> Vec<&PathBuf> {
        self.regions
            .iter()
            .filter_map(|r| match &r.outcome {
                RegionOutcome::Accepted { path, .. } => Some(path),
                RegionOutcome::Exhausted => None,
            })
            .collect()
    }
}
