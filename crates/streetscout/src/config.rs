//! Run configuration: JSON on disk plus the API credential from the
//! environment.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use streetscout_core::{GeometryError, Region};
use streetscout_quality::{InvalidQualityParams, QualityParams};

use crate::catalog::default_regions;
use crate::pipeline::SamplingParams;
use crate::sink::DEFAULT_JPEG_QUALITY;

/// Environment variable read for the provider credential.
pub const API_KEY_ENV: &str = "GCP_API_KEY";

/// Placeholder value shipped in sample configs; treated as missing.
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("no API key: pass --api-key or set {}", API_KEY_ENV)]
    MissingApiKey,
    #[error("invalid sampling params: {0}")]
    InvalidSampling(String),
    #[error(transparent)]
    InvalidQuality(#[from] InvalidQualityParams),
    #[error("region {name:?}: {source}")]
    InvalidRegion {
        name: String,
        #[source]
        source: GeometryError,
    },
    #[error("no regions configured")]
    NoRegions,
    #[error("invalid output settings: {0}")]
    InvalidOutput(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Provider credential. Never serialized; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Accept `raw` unless it is blank or the placeholder.
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == API_KEY_PLACEHOLDER {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Read the key from [`API_KEY_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(None)
    }

    /// Explicit value first, then the environment.
    pub fn resolve(explicit: Option<String>) -> Result<Self, ConfigError> {
        match explicit {
            Some(raw) => Self::new(raw),
            None => match std::env::var(API_KEY_ENV) {
                Ok(raw) => Self::new(raw),
                Err(_) => Err(ConfigError::MissingApiKey),
            },
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Requested view size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("streetscout_out")
}

fn default_regions_per_run() -> Option<usize> {
    Some(3)
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_outdoor_only() -> bool {
    true
}

/// Everything a run needs except the credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_regions")]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub sampling: SamplingParams,
    #[serde(default)]
    pub quality: QualityParams,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Number of distinct regions drawn per run; `None` runs all of them in
    /// catalog order.
    #[serde(default = "default_regions_per_run")]
    pub regions_per_run: Option<usize>,
    /// Seed for the run's random source; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub image_size: ImageSize,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Restrict metadata lookups to outdoor panoramas.
    #[serde(default = "default_outdoor_only")]
    pub outdoor_only: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            sampling: SamplingParams::default(),
            quality: QualityParams::default(),
            output_dir: default_output_dir(),
            regions_per_run: default_regions_per_run(),
            seed: None,
            image_size: ImageSize::default(),
            jpeg_quality: default_jpeg_quality(),
            request_timeout_secs: default_timeout_secs(),
            outdoor_only: default_outdoor_only(),
        }
    }
}

impl SamplerConfig {
    /// Load a JSON config from disk. Missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sampling(&self.sampling)?;
        self.quality.validate()?;

        if self.regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        for region in &self.regions {
            region
                .bbox
                .validate()
                .map_err(|source| ConfigError::InvalidRegion {
                    name: region.name.clone(),
                    source,
                })?;
        }
        if self.regions_per_run == Some(0) {
            return Err(ConfigError::InvalidSampling(
                "regions_per_run must be at least 1".into(),
            ));
        }

        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(ConfigError::InvalidOutput(format!(
                "image size {} has a zero side",
                self.image_size
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidOutput(format!(
                "jpeg_quality {} outside 1..=100",
                self.jpeg_quality
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidOutput(
                "request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn validate_sampling(p: &SamplingParams) -> Result<(), ConfigError> {
    let bad = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::InvalidSampling(msg)) };

    if p.attempts_per_region == 0 {
        return bad("attempts_per_region must be at least 1".into());
    }
    if p.primary_radius_m == 0 {
        return bad("primary_radius_m must be positive".into());
    }
    if p.fallback_radius_m <= p.primary_radius_m {
        return bad(format!(
            "fallback_radius_m ({}) must exceed primary_radius_m ({})",
            p.fallback_radius_m, p.primary_radius_m
        ));
    }
    if p.headings_deg.is_empty() {
        return bad("headings_deg must not be empty".into());
    }
    if let Some(h) = p
        .headings_deg
        .iter()
        .find(|h| !(0.0..360.0).contains(*h))
    {
        return bad(format!("heading {h} outside [0, 360)"));
    }
    if !p.fov_deg.is_finite() || p.fov_deg <= 0.0 || p.fov_deg > 120.0 {
        return bad(format!("fov_deg {} outside (0, 120]", p.fov_deg));
    }
    if !p.pitch_deg.is_finite() || p.pitch_deg.abs() > 90.0 {
        return bad(format!("pitch_deg {} outside [-90, 90]", p.pitch_deg));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = SamplerConfig::default();
        cfg.validate().expect("defaults are valid");
        assert_eq!(cfg.sampling.attempts_per_region, 5);
        assert_eq!(cfg.regions.len(), 9);
        assert_eq!(cfg.image_size.to_string(), "640x640");
    }

    #[test]
    fn api_key_rejects_blank_and_placeholder() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::MissingApiKey)));
        assert!(matches!(ApiKey::new("   "), Err(ConfigError::MissingApiKey)));
        assert!(matches!(
            ApiKey::new(API_KEY_PLACEHOLDER),
            Err(ConfigError::MissingApiKey)
        ));
        let key = ApiKey::new(" abc123 ").expect("key");
        assert_eq!(key.expose(), "abc123");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let key = ApiKey::resolve(Some("from-flag".into())).expect("key");
        assert_eq!(key.expose(), "from-flag");
    }

    #[test]
    fn sampling_errors_are_reported() {
        let mut cfg = SamplerConfig::default();
        cfg.sampling.attempts_per_region = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSampling(_))));

        let mut cfg = SamplerConfig::default();
        cfg.sampling.headings_deg.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSampling(_))));

        let mut cfg = SamplerConfig::default();
        cfg.sampling.fallback_radius_m = cfg.sampling.primary_radius_m;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSampling(_))));

        let mut cfg = SamplerConfig::default();
        cfg.sampling.fov_deg = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSampling(_))));

        for headings in [vec![400.0, -90.0], vec![0.0, 360.0], vec![f64::NAN]] {
            let mut cfg = SamplerConfig::default();
            cfg.sampling.headings_deg = headings;
            match cfg.validate() {
                Err(ConfigError::InvalidSampling(msg)) => assert!(msg.contains("heading")),
                other => panic!("expected heading error, got {other:?}"),
            }
        }
    }

    #[test]
    fn quality_and_region_errors_are_reported() {
        let mut cfg = SamplerConfig::default();
        cfg.quality.acceptance_threshold = 1.5;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidQuality(_))));

        let mut cfg = SamplerConfig::default();
        cfg.regions.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::NoRegions)));

        let mut cfg = SamplerConfig::default();
        cfg.regions[0].bbox.lat_min = 95.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SamplerConfig =
            serde_json::from_str(r#"{ "seed": 7, "sampling": { "attempts_per_region": 2 } }"#)
                .expect("parse");
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.sampling.attempts_per_region, 2);
        assert_eq!(cfg.sampling.primary_radius_m, 60);
        assert_eq!(cfg.regions_per_run, Some(3));
        assert!(cfg.outdoor_only);
    }

    #[test]
    fn json_round_trip_on_disk() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("config.json");
        let mut cfg = SamplerConfig::default();
        cfg.seed = Some(42);
        cfg.write_json(&path).expect("write");
        let back = SamplerConfig::load_json(&path).expect("load");
        assert_eq!(back.seed, Some(42));
        assert_eq!(back.sampling, cfg.sampling);
        assert_eq!(back.regions.len(), cfg.regions.len());
        assert_eq!(back.regions[4].city, "Dubai");
        back.validate().expect("valid after reload");
    }
}
