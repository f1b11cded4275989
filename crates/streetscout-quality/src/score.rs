use serde::{Deserialize, Serialize};
use streetscout_core::{rgb_to_luma, GrayImageView, RgbImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::canny::canny_edges;
use crate::gradient::{laplacian_variance, sobel_gradients};
use crate::params::QualityParams;

const RATIO_EPS: f32 = 1e-6;

/// Every intermediate term of a score, for logging and tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityBreakdown {
    /// Raw Laplacian variance before normalization.
    pub laplacian_variance: f32,
    /// Normalized sharpness term in [0, 1].
    pub sharpness: f32,
    /// Raw edge density of the upper half.
    pub upper_edge_density: f32,
    /// Raw edge density of the lower half.
    pub lower_edge_density: f32,
    /// Scaled, capped lower-half density term in [0, 1].
    pub lower_density: f32,
    /// Scaled, capped `max(0, lower - upper)` term in [0, 1].
    pub lower_minus_upper: f32,
    /// Share of mean gradient magnitude carried by d/dx, i.e. by vertical
    /// structures.
    pub vertical_ratio: f32,
    /// Multiplier applied by the wall penalty, in [1 - max_penalty, 1].
    pub penalty_factor: f32,
    /// Final score in [0, 1].
    pub score: f32,
}

/// Multiplicative penalty for frames dominated by vertical structure.
pub fn vertical_penalty_factor(vertical_ratio: f32, params: &QualityParams) -> f32 {
    let excess = vertical_ratio - params.vertical_ratio_threshold;
    if excess <= 0.0 {
        return 1.0;
    }
    let penalty = (excess * params.vertical_penalty_slope).min(params.max_vertical_penalty);
    1.0 - penalty
}

/// Score a grayscale frame with the full breakdown.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn score_gray_breakdown(img: &GrayImageView<'_>, params: &QualityParams) -> QualityBreakdown {
    let lap_var = laplacian_variance(img);
    let ceiling = params.laplacian_variance_ceiling;
    let sharpness = lap_var.min(ceiling) / ceiling;

    let grad = sobel_gradients(img);
    let edges = canny_edges(&grad, &params.edges);
    let mid = img.height / 2;
    let upper = edges.row_band_density(0, mid);
    let lower = edges.row_band_density(mid, img.height);
    let lower_density = (lower * params.lower_density_gain).min(1.0);
    let lower_minus_upper = ((lower - upper).max(0.0) * params.lower_minus_upper_gain).min(1.0);

    let (mean_gx, mean_gy) = grad.mean_abs();
    let vertical_ratio = mean_gx / (mean_gx + mean_gy + RATIO_EPS);
    let penalty_factor = vertical_penalty_factor(vertical_ratio, params);

    let w = &params.weights;
    let raw = w.sharpness * sharpness
        + w.lower_density * lower_density
        + w.lower_minus_upper * lower_minus_upper;
    let score = (raw * penalty_factor).clamp(0.0, 1.0);

    QualityBreakdown {
        laplacian_variance: lap_var,
        sharpness,
        upper_edge_density: upper,
        lower_edge_density: lower,
        lower_density,
        lower_minus_upper,
        vertical_ratio,
        penalty_factor,
        score,
    }
}

/// Street-level meaningfulness of a grayscale frame, in [0, 1].
///
/// Deterministic and history-free: the same pixels always give the same
/// score.
pub fn score_gray(img: &GrayImageView<'_>, params: &QualityParams) -> f32 {
    score_gray_breakdown(img, params).score
}

/// Score an RGB frame with the full breakdown.
pub fn score_rgb_breakdown(img: &RgbImageView<'_>, params: &QualityParams) -> QualityBreakdown {
    let gray = rgb_to_luma(img);
    score_gray_breakdown(&gray.view(), params)
}

/// Street-level meaningfulness of an RGB frame, in [0, 1].
pub fn score_rgb(img: &RgbImageView<'_>, params: &QualityParams) -> f32 {
    score_rgb_breakdown(img, params).score
}

/// `score_rgb(img) >= params.acceptance_threshold`.
pub fn is_meaningful(img: &RgbImageView<'_>, params: &QualityParams) -> bool {
    params.accepts(score_rgb(img, params))
}
