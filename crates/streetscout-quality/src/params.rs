use serde::{Deserialize, Serialize};

/// Hysteresis thresholds for the edge mask, on the L1 Sobel magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeThresholds {
    /// Pixels at or below this magnitude are never edges.
    pub low: f32,
    /// Pixels above this magnitude seed edges; pixels between `low` and
    /// `high` survive only when connected to a seed.
    pub high: f32,
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: 60.0,
            high: 160.0,
        }
    }
}

/// Linear weights of the three score terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub sharpness: f32,
    pub lower_density: f32,
    pub lower_minus_upper: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            sharpness: 0.45,
            lower_density: 0.30,
            lower_minus_upper: 0.25,
        }
    }
}

/// Tunable constants of the street-level score.
///
/// The defaults are empirical; they have no derivation beyond having worked
/// on real panoramas, so treat them as a starting point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityParams {
    /// Laplacian variance at which the sharpness term saturates at 1.
    pub laplacian_variance_ceiling: f32,
    pub edges: EdgeThresholds,
    /// Multiplier on the lower-half edge density before capping at 1.
    pub lower_density_gain: f32,
    /// Multiplier on `max(0, lower - upper)` edge density before capping at 1.
    pub lower_minus_upper_gain: f32,
    /// Share of gradient energy from vertical structures above which the
    /// wall penalty engages.
    pub vertical_ratio_threshold: f32,
    /// Penalty per unit of vertical ratio above the threshold.
    pub vertical_penalty_slope: f32,
    /// Upper bound on the fraction of the score the wall penalty removes.
    pub max_vertical_penalty: f32,
    pub weights: ScoreWeights,
    /// Minimum score for a frame to count as street-level meaningful.
    pub acceptance_threshold: f32,
}

impl Default for QualityParams {
    fn default() -> Self {
        Self {
            laplacian_variance_ceiling: 300.0,
            edges: EdgeThresholds::default(),
            lower_density_gain: 3.0,
            lower_minus_upper_gain: 3.0,
            vertical_ratio_threshold: 0.60,
            vertical_penalty_slope: 1.25,
            max_vertical_penalty: 0.5,
            weights: ScoreWeights::default(),
            acceptance_threshold: 0.5,
        }
    }
}

/// Reason a [`QualityParams`] value cannot be used.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("invalid quality params: {0}")]
pub struct InvalidQualityParams(pub String);

impl QualityParams {
    /// Whether `score` clears the acceptance threshold (inclusive).
    #[inline]
    pub fn accepts(&self, score: f32) -> bool {
        score >= self.acceptance_threshold
    }

    /// Reject settings that would make the score undefined or leave [0, 1].
    pub fn validate(&self) -> Result<(), InvalidQualityParams> {
        let bad = |msg: &str| -> Result<(), InvalidQualityParams> {
            Err(InvalidQualityParams(msg.to_string()))
        };
        let w = &self.weights;
        let finite = [
            self.laplacian_variance_ceiling,
            self.edges.low,
            self.edges.high,
            self.lower_density_gain,
            self.lower_minus_upper_gain,
            self.vertical_ratio_threshold,
            self.vertical_penalty_slope,
            self.max_vertical_penalty,
            w.sharpness,
            w.lower_density,
            w.lower_minus_upper,
            self.acceptance_threshold,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return bad("all values must be finite");
        }
        if self.laplacian_variance_ceiling <= 0.0 {
            return bad("laplacian_variance_ceiling must be positive");
        }
        if self.edges.low < 0.0 || self.edges.low > self.edges.high {
            return bad("edge thresholds must satisfy 0 <= low <= high");
        }
        if !(0.0..=1.0).contains(&self.max_vertical_penalty) {
            return bad("max_vertical_penalty must lie in [0, 1]");
        }
        if self.vertical_penalty_slope < 0.0 {
            return bad("vertical_penalty_slope must be non-negative");
        }
        if w.sharpness < 0.0 || w.lower_density < 0.0 || w.lower_minus_upper < 0.0 {
            return bad("weights must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return bad("acceptance_threshold must lie in [0, 1]");
        }
        Ok(())
    }
}
