//! The panorama provider boundary.
//!
//! The sampling loop only needs two questions answered: "is there a
//! panorama near this point?" and "what does it look like from this
//! heading?". Every failure behind either question (transport error,
//! timeout, non-success status, undecodable payload) is reported as `None`.

use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use streetscout_core::Coordinate;

/// Opaque panorama identifier, valid for one sampling attempt.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanoramaId(pub String);

impl PanoramaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanoramaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Camera parameters for one view of a panorama.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRequest {
    /// Compass heading in degrees, `[0, 360)`.
    pub heading_deg: f64,
    /// Horizontal field of view in degrees.
    pub fov_deg: f64,
    /// Camera pitch in degrees, positive looks up.
    pub pitch_deg: f64,
}

/// Source of panorama metadata and rendered views.
pub trait PanoramaProvider {
    /// Nearest panorama within `radius_m` metres of `at`, if any.
    fn resolve_panorama(&self, at: Coordinate, radius_m: u32) -> Option<PanoramaId>;

    /// Render `pano` with the given camera, if available.
    fn fetch_image(&self, pano: &PanoramaId, view: &ViewRequest) -> Option<RgbImage>;
}

impl<P: PanoramaProvider + ?Sized> PanoramaProvider for &P {
    fn resolve_panorama(&self, at: Coordinate, radius_m: u32) -> Option<PanoramaId> {
        (**self).resolve_panorama(at, radius_m)
    }

    fn fetch_image(&self, pano: &PanoramaId, view: &ViewRequest) -> Option<RgbImage> {
        (**self).fetch_image(pano, view)
    }
}

impl<P: PanoramaProvider + ?Sized> PanoramaProvider for Box<P> {
    fn resolve_panorama(&self, at: Coordinate, radius_m: u32) -> Option<PanoramaId> {
        (**self).resolve_panorama(at, radius_m)
    }

    fn fetch_image(&self, pano: &PanoramaId, view: &ViewRequest) -> Option<RgbImage> {
        (**self).fetch_image(pano, view)
    }
}
