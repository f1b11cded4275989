use serde::{Deserialize, Serialize};

/// Knobs of the per-region sampling loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Coordinates drawn per region before giving up.
    pub attempts_per_region: usize,
    /// First panorama search radius, metres.
    pub primary_radius_m: u32,
    /// Second, wider search radius used once when the first finds nothing.
    pub fallback_radius_m: u32,
    /// Headings tried for every resolved panorama, in degrees. Visited in a
    /// freshly shuffled order per attempt.
    pub headings_deg: Vec<f64>,
    pub fov_deg: f64,
    pub pitch_deg: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            attempts_per_region: 5,
            primary_radius_m: 60,
            fallback_radius_m: 200,
            headings_deg: vec![0.0, 90.0, 180.0, 270.0],
            fov_deg: 80.0,
            pitch_deg: 0.0,
        }
    }
}
