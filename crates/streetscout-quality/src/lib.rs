//! Street-level meaningfulness score for panorama frames.
//!
//! A frame scores well when it is in focus, shows ground-level structure in
//! its lower half (curbs, road markings) and is not filled by a wall or
//! fence. The score is a weighted sum of three terms in [0, 1]:
//!
//! - `sharpness`: Laplacian variance, clamped to a ceiling and normalized;
//! - `lower_density`: edge density of the lower half, scaled and capped;
//! - `lower_minus_upper`: how much denser the lower half is than the upper.
//!
//! The sum is then multiplied by a wall penalty that engages when the
//! horizontal derivative (vertical structures) dominates the gradient
//! energy, and clamped to [0, 1]. All constants live in [`QualityParams`].
//!
//! ```
//! use streetscout_core::RgbImageView;
//! use streetscout_quality::{score_rgb, QualityParams};
//!
//! let pixels = vec![128u8; 64 * 64 * 3];
//! let view = RgbImageView { width: 64, height: 64, data: &pixels };
//! let s = score_rgb(&view, &QualityParams::default());
//! assert_eq!(s, 0.0);
//! ```

mod canny;
mod gradient;
mod params;
mod score;

pub use canny::{canny_edges, EdgeMask};
pub use gradient::{laplacian_variance, sobel_gradients, Gradients};
pub use params::{EdgeThresholds, InvalidQualityParams, QualityParams, ScoreWeights};
pub use score::{
    is_meaningful, score_gray, score_gray_breakdown, score_rgb, score_rgb_breakdown,
    vertical_penalty_factor, QualityBreakdown,
};
