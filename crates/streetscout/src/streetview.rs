//! HTTP panorama provider backed by the Street View Static API.

use std::time::Duration;

use image::RgbImage;
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use streetscout_core::Coordinate;

use crate::config::{ApiKey, ImageSize, SamplerConfig};
use crate::provider::{PanoramaId, PanoramaProvider, ViewRequest};

pub const DEFAULT_METADATA_URL: &str = "https://maps.googleapis.com/maps/api/streetview/metadata";
pub const DEFAULT_IMAGE_URL: &str = "https://maps.googleapis.com/maps/api/streetview";

/// Why a provider request produced nothing. Logged, then collapsed to
/// `None` at the [`PanoramaProvider`] boundary.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("http: {0}")]
    Http(#[source] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("metadata status {0:?}")]
    NotFound(String),
    #[error("metadata without pano_id")]
    MissingPanoId,
    #[error("decode: {0}")]
    Decode(#[from] image::ImageError),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs carry the API key in their query string.
        Self::Http(err.without_url())
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    status: String,
    #[serde(default)]
    pano_id: Option<String>,
}

/// Blocking Street View client.
#[derive(Debug)]
pub struct StreetViewClient {
    client: Client,
    key: ApiKey,
    metadata_url: String,
    image_url: String,
    image_size: ImageSize,
    outdoor_only: bool,
}

impl StreetViewClient {
    pub fn new(
        key: ApiKey,
        image_size: ImageSize,
        timeout: Duration,
        outdoor_only: bool,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            key,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            image_size,
            outdoor_only,
        })
    }

    pub fn from_config(key: ApiKey, config: &SamplerConfig) -> Result<Self, ProviderError> {
        Self::new(
            key,
            config.image_size,
            Duration::from_secs(config.request_timeout_secs),
            config.outdoor_only,
        )
    }

    /// Point the client at other endpoints, e.g. a local mock server.
    pub fn with_endpoints(
        mut self,
        metadata_url: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        self.metadata_url = metadata_url.into();
        self.image_url = image_url.into();
        self
    }

    fn metadata_query(&self, at: Coordinate, radius_m: u32) -> Vec<(&'static str, String)> {
        let mut q = vec![
            ("location", at.to_fixed5()),
            ("radius", radius_m.to_string()),
        ];
        if self.outdoor_only {
            q.push(("source", "outdoor".to_string()));
        }
        q.push(("key", self.key.expose().to_string()));
        q
    }

    fn image_query(&self, pano: &PanoramaId, view: &ViewRequest) -> Vec<(&'static str, String)> {
        vec![
            ("pano", pano.as_str().to_string()),
            ("size", self.image_size.to_string()),
            ("heading", view.heading_deg.to_string()),
            ("pitch", view.pitch_deg.to_string()),
            ("fov", view.fov_deg.to_string()),
            ("key", self.key.expose().to_string()),
        ]
    }

    /// Metadata lookup with every failure kept as an error.
    pub fn try_resolve(&self, at: Coordinate, radius_m: u32) -> Result<PanoramaId, ProviderError> {
        let resp = self
            .client
            .get(&self.metadata_url)
            .query(&self.metadata_query(at, radius_m))
            .send()?;
        if resp.status() != StatusCode::OK {
            return Err(ProviderError::Status(resp.status()));
        }
        let meta: Metadata = resp.json()?;
        panorama_from_metadata(meta)
    }

    /// Image download with every failure kept as an error.
    pub fn try_fetch(&self, pano: &PanoramaId, view: &ViewRequest) -> Result<RgbImage, ProviderError> {
        let resp = self
            .client
            .get(&self.image_url)
            .query(&self.image_query(pano, view))
            .send()?;
        if resp.status() != StatusCode::OK {
            return Err(ProviderError::Status(resp.status()));
        }
        let bytes = resp.bytes()?;
        Ok(image::load_from_memory(&bytes)?.to_rgb8())
    }
}

fn panorama_from_metadata(meta: Metadata) -> Result<PanoramaId, ProviderError> {
    if meta.status != "OK" {
        return Err(ProviderError::NotFound(meta.status));
    }
    meta.pano_id
        .filter(|id| !id.is_empty())
        .map(PanoramaId)
        .ok_or(ProviderError::MissingPanoId)
}

fn log_failure(what: &str, err: &ProviderError) {
    match err {
        // Empty coverage is the common case, not a fault.
        ProviderError::NotFound(_) => debug!("{what}: {err}"),
        _ => warn!("{what}: {err}"),
    }
}

impl PanoramaProvider for StreetViewClient {
    fn resolve_panorama(&self, at: Coordinate, radius_m: u32) -> Option<PanoramaId> {
        self.try_resolve(at, radius_m)
            .map_err(|err| log_failure(&format!("metadata {} r={radius_m}", at.to_fixed5()), &err))
            .ok()
    }

    fn fetch_image(&self, pano: &PanoramaId, view: &ViewRequest) -> Option<RgbImage> {
        self.try_fetch(pano, view)
            .map_err(|err| log_failure(&format!("image {pano} h={}", view.heading_deg), &err))
            .ok()
    }
}
