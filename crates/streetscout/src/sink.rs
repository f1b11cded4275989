//! Where accepted samples go.

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use streetscout_core::Coordinate;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Errors returned when an accepted sample cannot be persisted.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Persistence for accepted samples.
pub trait SampleSink {
    /// Store `raster` for `city` at `at`, returning where it went.
    fn persist(&mut self, city: &str, at: Coordinate, raster: &RgbImage)
        -> Result<PathBuf, SinkError>;
}

impl<S: SampleSink + ?Sized> SampleSink for &mut S {
    fn persist(
        &mut self,
        city: &str,
        at: Coordinate,
        raster: &RgbImage,
    ) -> Result<PathBuf, SinkError> {
        (**self).persist(city, at, raster)
    }
}

/// `"41.87812,-87.62988.jpg"`: the coordinate at 5 decimals, sign kept.
pub fn sample_file_name(at: Coordinate) -> String {
    format!("{}.jpg", at.to_fixed5())
}

/// Directory-safe form of a city name: whitespace and anything that is
/// not alphanumeric, `-`, `_` or `.` becomes `_`.
pub fn city_dir_name(city: &str) -> String {
    let name: String = city
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match name.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => name,
    }
}

/// Writes JPEGs to `<root>/<city>/<lat>,<lng>.jpg`.
///
/// Directories are created on first write; creating an existing one is not
/// an error.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    root: PathBuf,
    jpeg_quality: u8,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the JPEG quality, clamped to `1..=100`.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a sample for `city` at `at` would be written to.
    pub fn path_for(&self, city: &str, at: Coordinate) -> PathBuf {
        self.root
            .join(city_dir_name(city))
            .join(sample_file_name(at))
    }
}

impl SampleSink for DirectorySink {
    fn persist(
        &mut self,
        city: &str,
        at: Coordinate,
        raster: &RgbImage,
    ) -> Result<PathBuf, SinkError> {
        let path = self.path_for(city, at);

        // Nothing touches disk until the encode has succeeded.
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.jpeg_quality)
            .encode_image(raster)
            .map_err(|source| SinkError::Encode {
                path: path.clone(),
                source,
            })?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| SinkError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &encoded).map_err(|source| SinkError::Write {
            path: path.clone(),
            source,
        })?;

        log::debug!("wrote {}", path.display());
        Ok(path)
    }
}

/// An accepted view together with where it was taken.
#[derive(Clone, Debug)]
pub struct AcceptedSample {
    pub city: String,
    pub at: Coordinate,
    pub raster: RgbImage,
}

/// Keeps accepted samples in memory instead of writing them.
///
/// Used for dry runs and tests; reported paths mirror the directory
/// layout of [`DirectorySink`] under a relative root.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub samples: Vec<AcceptedSample>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleSink for MemorySink {
    fn persist(
        &mut self,
        city: &str,
        at: Coordinate,
        raster: &RgbImage,
    ) -> Result<PathBuf, SinkError> {
        self.samples.push(AcceptedSample {
            city: city.to_string(),
            at,
            raster: raster.clone(),
        });
        Ok(PathBuf::from(city_dir_name(city)).join(sample_file_name(at)))
    }
}
