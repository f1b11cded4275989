//! Core types for street-level imagery sampling.
//!
//! This crate holds the geographic primitives (regions, bounding boxes,
//! coordinates), the seeded coordinate sampler and small raster views. It
//! does *not* depend on any concrete image library or network client.

mod geo;
mod image;
mod logger;
mod sampler;

pub use geo::{BoundingBox, Coordinate, GeometryError, Region};
pub use image::{reflect101, rgb_to_luma, GrayImage, GrayImageView, RgbImageView};
pub use sampler::sample_coordinate;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
