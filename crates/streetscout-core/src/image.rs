//! Lightweight raster views, independent of any image library.

/// Borrowed interleaved 8-bit RGB raster, row-major, `len = w*h*3`.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

impl GrayImageView<'_> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Pixel lookup with mirrored borders (`dcb|abcd|cba`).
    #[inline]
    pub fn get_reflect(&self, x: isize, y: isize) -> u8 {
        let xi = reflect101(x, self.width);
        let yi = reflect101(y, self.height);
        self.data[yi * self.width + xi]
    }
}

/// Mirror an index into `0..n` without repeating the edge sample.
#[inline]
pub fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let period = 2 * (n - 1);
    let mut m = i.rem_euclid(period);
    if m >= n {
        m = period - m;
    }
    m as usize
}

// BT.601 luma weights in Q14 fixed point.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Convert an RGB view to single-channel intensity.
///
/// Uses `0.299 R + 0.587 G + 0.114 B`, rounded to the nearest level.
pub fn rgb_to_luma(src: &RgbImageView<'_>) -> GrayImage {
    let n = src.width * src.height;
    debug_assert_eq!(src.data.len(), n * 3);
    let data = src
        .data
        .chunks_exact(3)
        .take(n)
        .map(|px| {
            let acc = px[0] as u32 * LUMA_R
                + px[1] as u32 * LUMA_G
                + px[2] as u32 * LUMA_B
                + (1 << (LUMA_SHIFT - 1));
            (acc >> LUMA_SHIFT).min(255) as u8
        })
        .collect();
    GrayImage {
        width: src.width,
        height: src.height,
        data,
    }
}
