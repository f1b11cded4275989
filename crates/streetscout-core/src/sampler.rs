//! Uniform coordinate sampling inside a bounding box.
//!
//! The random source is always injected so a seeded generator reproduces the
//! exact sequence of draws.

use rand::Rng;

use crate::geo::{BoundingBox, Coordinate};

/// Draw a coordinate uniformly from `bbox`.
///
/// Latitude and longitude are drawn independently from the closed intervals
/// `[lat_min, lat_max]` and `[lng_min, lng_max]`, latitude first. A box with
/// equal limits on an axis yields that limit.
///
/// `bbox` must satisfy `min <= max` on both axes (see
/// [`BoundingBox::validate`]); an inverted box panics inside `rand`.
pub fn sample_coordinate<R: Rng + ?Sized>(bbox: &BoundingBox, rng: &mut R) -> Coordinate {
    let lat = rng.random_range(bbox.lat_min..=bbox.lat_max);
    let lng = rng.random_range(bbox.lng_min..=bbox.lng_max);
    Coordinate::new(lat, lng)
}
