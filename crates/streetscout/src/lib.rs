//! Street-level imagery sampler.
//!
//! Draws random coordinates inside city bounding boxes, resolves the
//! nearest panorama, renders it at several headings and keeps the view that
//! looks most like a street (see [`streetscout_quality`]). One accepted view
//! per region is written as `<out>/<city>/<lat>,<lng>.jpg`.
//!
//! The panorama source and the output are traits, so the loop runs offline
//! against fakes:
//!
//! ```
//! use image::RgbImage;
//! use rand::{rngs::StdRng, SeedableRng};
//! use streetscout::{
//!     default_regions, Coordinate, MemorySink, PanoramaId, PanoramaProvider, QualityParams,
//!     RegionOutcome, RegionSampler, SamplingParams, ViewRequest,
//! };
//!
//! struct NoCoverage;
//!
//! impl PanoramaProvider for NoCoverage {
//!     fn resolve_panorama(&self, _at: Coordinate, _radius_m: u32) -> Option<PanoramaId> {
//!         None
//!     }
//!     fn fetch_image(&self, _pano: &PanoramaId, _view: &ViewRequest) -> Option<RgbImage> {
//!         None
//!     }
//! }
//!
//! let mut sampler = RegionSampler::new(
//!     NoCoverage,
//!     MemorySink::new(),
//!     SamplingParams::default(),
//!     QualityParams::default(),
//! );
//! let mut rng = StdRng::seed_from_u64(1);
//! let report = sampler.sample_region(&default_regions()[0], &mut rng).unwrap();
//! assert_eq!(report.outcome, RegionOutcome::Exhausted);
//! ```

mod catalog;
mod config;
mod error;
mod pipeline;
mod provider;
mod sink;
#[cfg(feature = "http")]
mod streetview;

pub use catalog::{default_regions, CITY_HALF_EXTENT_DEG};
pub use config::{
    ApiKey, ConfigError, ImageSize, SamplerConfig, API_KEY_ENV, API_KEY_PLACEHOLDER,
};
pub use error::RunError;
pub use pipeline::{
    best_candidate, pick_better, AttemptOutcome, AttemptRecord, Candidate, RegionOutcome,
    RegionReport, RegionSampler, RunSummary, SamplingParams,
};
pub use provider::{PanoramaId, PanoramaProvider, ViewRequest};
pub use sink::{
    city_dir_name, sample_file_name, AcceptedSample, DirectorySink, MemorySink, SampleSink,
    SinkError, DEFAULT_JPEG_QUALITY,
};
#[cfg(feature = "http")]
pub use streetview::{ProviderError, StreetViewClient, DEFAULT_IMAGE_URL, DEFAULT_METADATA_URL};

pub use streetscout_core::{
    init_with_level, level_from_verbosity, sample_coordinate, BoundingBox, Coordinate,
    GeometryError, Region, RgbImageView,
};
#[cfg(feature = "tracing")]
pub use streetscout_core::init_tracing;
pub use streetscout_quality::{
    is_meaningful, score_rgb, score_rgb_breakdown, QualityBreakdown, QualityParams,
};

/// Borrow an `image` RGB buffer as a core raster view.
pub fn rgb_view(img: &image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Score breakdown of an `image` RGB buffer.
pub fn score_image(img: &image::RgbImage, params: &QualityParams) -> QualityBreakdown {
    score_rgb_breakdown(&rgb_view(img), params)
}
