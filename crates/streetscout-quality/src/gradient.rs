//! 3×3 Sobel derivatives and the Laplacian variance.
//!
//! Borders are mirrored without repeating the edge pixel, so a flat frame
//! yields exactly zero everywhere.

use streetscout_core::GrayImageView;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];
const LAPLACIAN_KERNEL: Kernel3 = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];

/// Per-pixel horizontal and vertical derivatives, row-major.
#[derive(Clone, Debug)]
pub struct Gradients {
    pub width: usize,
    pub height: usize,
    /// d/dx: responds to vertical structures (poles, wall seams, fences).
    pub gx: Vec<f32>,
    /// d/dy: responds to horizontal structures (curbs, horizon, road marks).
    pub gy: Vec<f32>,
}

impl Gradients {
    /// L1 magnitude `|gx| + |gy|` per pixel.
    pub fn l1_magnitude(&self) -> Vec<f32> {
        self.gx
            .iter()
            .zip(&self.gy)
            .map(|(x, y)| x.abs() + y.abs())
            .collect()
    }

    /// Mean of `|gx|` and mean of `|gy|` over the frame.
    pub fn mean_abs(&self) -> (f32, f32) {
        let n = self.gx.len();
        if n == 0 {
            return (0.0, 0.0);
        }
        let (sx, sy) = self
            .gx
            .iter()
            .zip(&self.gy)
            .fold((0.0f64, 0.0f64), |(sx, sy), (x, y)| {
                (sx + x.abs() as f64, sy + y.abs() as f64)
            });
        ((sx / n as f64) as f32, (sy / n as f64) as f32)
    }
}

#[inline]
fn convolve_at(img: &GrayImageView<'_>, x: usize, y: usize, k: &Kernel3) -> f32 {
    let mut acc = 0.0;
    for (ky, k_row) in k.iter().enumerate() {
        let yy = y as isize + ky as isize - 1;
        for (kx, &w) in k_row.iter().enumerate() {
            if w == 0.0 {
                continue;
            }
            let xx = x as isize + kx as isize - 1;
            acc += w * img.get_reflect(xx, yy) as f32;
        }
    }
    acc
}

/// Compute Sobel derivatives on a grayscale view.
pub fn sobel_gradients(img: &GrayImageView<'_>) -> Gradients {
    let (w, h) = (img.width, img.height);
    let mut gx = vec![0.0f32; w * h];
    let mut gy = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            gx[idx] = convolve_at(img, x, y, &SOBEL_KERNEL_X);
            gy[idx] = convolve_at(img, x, y, &SOBEL_KERNEL_Y);
        }
    }
    Gradients {
        width: w,
        height: h,
        gx,
        gy,
    }
}

/// Population variance of the 4-neighbour Laplacian response.
///
/// High for in-focus detail, near zero for blurred or flat frames.
pub fn laplacian_variance(img: &GrayImageView<'_>) -> f32 {
    let n = img.width * img.height;
    if n == 0 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in 0..img.height {
        for x in 0..img.width {
            let v = convolve_at(img, x, y, &LAPLACIAN_KERNEL) as f64;
            sum += v;
            sum_sq += v * v;
        }
    }
    let mean = sum / n as f64;
    (sum_sq / n as f64 - mean * mean).max(0.0) as f32
}
