//! Canny-style binary edge mask.
//!
//! Sobel gradients → L1 magnitude → non-maximum suppression along the
//! quantized gradient direction → double-threshold hysteresis with
//! 8-connectivity. The outermost 1-pixel frame is never marked.

use crate::gradient::Gradients;
use crate::params::EdgeThresholds;

const TAN_22_5_DEG: f32 = 0.414_213_57;

/// Binary edge map, row-major.
#[derive(Clone, Debug)]
pub struct EdgeMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl EdgeMask {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    /// Fraction of edge pixels among rows `y0..y1`. Empty bands give 0.
    pub fn row_band_density(&self, y0: usize, y1: usize) -> f32 {
        let y1 = y1.min(self.height);
        if y0 >= y1 || self.width == 0 {
            return 0.0;
        }
        let band = &self.data[y0 * self.width..y1 * self.width];
        let count = band.iter().filter(|&&e| e).count();
        count as f32 / band.len() as f32
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&e| e).count()
    }
}

/// Thin ridges of `mag` along the quantized gradient direction.
///
/// Horizontal and vertical directions keep a pixel that beats the neighbour
/// behind it and is not beaten by the one ahead, so exactly one pixel of a
/// two-pixel Sobel plateau survives. Diagonal directions require a strict
/// maximum over both neighbours, as OpenCV's Canny does.
fn non_max_suppress(grad: &Gradients, mag: &[f32], low: f32) -> Vec<f32> {
    let (w, h) = (grad.width, grad.height);
    let mut out = vec![0.0f32; w * h];
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= low {
                continue;
            }
            let gx = grad.gx[idx];
            let gy = grad.gy[idx];
            let (ax, ay) = (gx.abs(), gy.abs());
            let same_sign = (gx >= 0.0) == (gy >= 0.0);

            let (behind, ahead, diagonal) = if ay <= ax * TAN_22_5_DEG {
                (idx - 1, idx + 1, false)
            } else if ax <= ay * TAN_22_5_DEG {
                (idx - w, idx + w, false)
            } else if same_sign {
                (idx - w - 1, idx + w + 1, true)
            } else {
                (idx - w + 1, idx + w - 1, true)
            };

            let beats_ahead = if diagonal {
                m > mag[ahead]
            } else {
                m >= mag[ahead]
            };
            if m > mag[behind] && beats_ahead {
                out[idx] = m;
            }
        }
    }
    out
}

/// Promote suppressed responses above `high` to edges and grow them through
/// 8-connected responses above `low`.
fn hysteresis(thin: &[f32], w: usize, h: usize, t: &EdgeThresholds) -> Vec<bool> {
    let mut edges = vec![false; w * h];
    let mut stack: Vec<usize> = thin
        .iter()
        .enumerate()
        .filter(|(_, &m)| m > t.high)
        .map(|(i, _)| i)
        .collect();
    for &i in &stack {
        edges[i] = true;
    }

    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % w, idx / w);
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if !edges[n] && thin[n] > t.low {
                    edges[n] = true;
                    stack.push(n);
                }
            }
        }
    }
    edges
}

/// Detect edges from precomputed gradients.
pub fn canny_edges(grad: &Gradients, thresholds: &EdgeThresholds) -> EdgeMask {
    let mag = grad.l1_magnitude();
    let thin = non_max_suppress(grad, &mag, thresholds.low);
    let data = hysteresis(&thin, grad.width, grad.height, thresholds);
    EdgeMask {
        width: grad.width,
        height: grad.height,
        data,
    }
}
