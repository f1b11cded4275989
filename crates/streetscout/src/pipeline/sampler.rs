use log::{debug, info};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use streetscout_core::{sample_coordinate, Coordinate, Region};
use streetscout_quality::{score_rgb, QualityParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::outcome::{
    AttemptOutcome, AttemptRecord, Candidate, RegionOutcome, RegionReport, RunSummary,
};
use super::params::SamplingParams;
use super::select::best_candidate;
use crate::config::{ConfigError, SamplerConfig};
use crate::error::RunError;
use crate::provider::{PanoramaId, PanoramaProvider, ViewRequest};
use crate::rgb_view;
use crate::sink::{SampleSink, SinkError};

/// Drives the sampling loop against a provider and a sink.
///
/// All randomness comes from the `rng` passed to each call, so a seeded
/// generator replays the same coordinates and heading orders.
#[derive(Debug)]
pub struct RegionSampler<P, S> {
    provider: P,
    sink: S,
    sampling: SamplingParams,
    quality: QualityParams,
}

impl<P: PanoramaProvider, S: SampleSink> RegionSampler<P, S> {
    pub fn new(provider: P, sink: S, sampling: SamplingParams, quality: QualityParams) -> Self {
        Self {
            provider,
            sink,
            sampling,
            quality,
        }
    }

    /// Validate `config` and take its sampling and quality parameters.
    pub fn from_config(provider: P, sink: S, config: &SamplerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            provider,
            sink,
            config.sampling.clone(),
            config.quality,
        ))
    }

    pub fn sampling(&self) -> &SamplingParams {
        &self.sampling
    }

    pub fn quality(&self) -> &QualityParams {
        &self.quality
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (P, S) {
        (self.provider, self.sink)
    }

    /// Nearest panorama at the primary radius, else at the fallback radius.
    ///
    /// Returns the panorama together with the radius that found it.
    pub fn resolve(&self, at: Coordinate) -> Option<(PanoramaId, u32)> {
        let radii = [self.sampling.primary_radius_m, self.sampling.fallback_radius_m];
        radii.into_iter().find_map(|radius| {
            let pano = self.provider.resolve_panorama(at, radius);
            if pano.is_none() {
                debug!("no panorama within {radius} m of {}", at.to_fixed5());
            }
            pano.map(|p| (p, radius))
        })
    }

    /// Render `pano` at every heading in `order` and keep the best view.
    ///
    /// Headings whose fetch fails are skipped. Ties keep the heading visited
    /// first.
    pub fn best_view(&self, pano: &PanoramaId, order: &[f64]) -> Option<Candidate> {
        let candidates = order.iter().filter_map(|&heading_deg| {
            let view = ViewRequest {
                heading_deg,
                fov_deg: self.sampling.fov_deg,
                pitch_deg: self.sampling.pitch_deg,
            };
            let Some(image) = self.provider.fetch_image(pano, &view) else {
                debug!("pano {pano} heading {heading_deg}: no image");
                return None;
            };
            let score = score_rgb(&rgb_view(&image), &self.quality);
            debug!("pano {pano} heading {heading_deg}: score {score:.3}");
            Some(Candidate {
                heading_deg,
                image,
                score,
            })
        });
        best_candidate(candidates)
    }

    /// Run one attempt: draw, resolve, render, score, maybe persist.
    fn attempt<R: Rng + ?Sized>(
        &mut self,
        region: &Region,
        rng: &mut R,
    ) -> Result<AttemptRecord, SinkError> {
        let coordinate = sample_coordinate(&region.bbox, rng);
        let Some((pano, radius_m)) = self.resolve(coordinate) else {
            return Ok(AttemptRecord {
                coordinate,
                radius_m: None,
                heading_order: Vec::new(),
                outcome: AttemptOutcome::NoPanorama,
            });
        };

        let mut heading_order = self.sampling.headings_deg.clone();
        heading_order.shuffle(rng);

        let outcome = match self.best_view(&pano, &heading_order) {
            None => AttemptOutcome::NoImagery { pano },
            Some(best) if self.quality.accepts(best.score) => {
                let path = self.sink.persist(&region.city, coordinate, &best.image)?;
                AttemptOutcome::Accepted {
                    pano,
                    heading_deg: best.heading_deg,
                    score: best.score,
                    path,
                }
            }
            Some(best) => AttemptOutcome::BelowThreshold {
                pano,
                heading_deg: best.heading_deg,
                score: best.score,
            },
        };

        Ok(AttemptRecord {
            coordinate,
            radius_m: Some(radius_m),
            heading_order,
            outcome,
        })
    }

    /// Sample `region` until a view is accepted or the attempt budget runs
    /// out.
    ///
    /// At most one file is written per call. A sink failure aborts the
    /// region and is returned.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(region = %region.name, city = %region.city))
    )]
    pub fn sample_region<R: Rng + ?Sized>(
        &mut self,
        region: &Region,
        rng: &mut R,
    ) -> Result<RegionReport, SinkError> {
        let mut attempts = Vec::with_capacity(self.sampling.attempts_per_region);

        for n in 1..=self.sampling.attempts_per_region {
            let record = self.attempt(region, rng)?;
            debug!(
                "{} attempt {n}/{}: {} -> {:?}",
                region.city,
                self.sampling.attempts_per_region,
                record.coordinate.to_fixed5(),
                record.outcome
            );

            if let AttemptOutcome::Accepted {
                heading_deg,
                score,
                path,
                ..
            } = &record.outcome
            {
                let outcome = RegionOutcome::Accepted {
                    coordinate: record.coordinate,
                    heading_deg: *heading_deg,
                    score: *score,
                    path: path.clone(),
                };
                info!(
                    "{} ({}): accepted heading {heading_deg} score {score:.3} after {n} attempt(s) -> {}",
                    region.name,
                    region.city,
                    path.display()
                );
                attempts.push(record);
                return Ok(RegionReport {
                    region: region.name.clone(),
                    city: region.city.clone(),
                    attempts,
                    outcome,
                });
            }
            attempts.push(record);
        }

        let report = RegionReport {
            region: region.name.clone(),
            city: region.city.clone(),
            attempts,
            outcome: RegionOutcome::Exhausted,
        };
        match report.best_score() {
            Some(best) => info!(
                "{} ({}): exhausted, best score {best:.3}",
                region.name, region.city
            ),
            None => info!("{} ({}): exhausted, no imagery", region.name, region.city),
        }
        Ok(report)
    }

    /// Sample a set of regions in turn.
    ///
    /// With `regions_per_run = Some(k)`, `k` distinct regions are drawn from
    /// `regions` in random order; with `None` every region runs in the given
    /// order.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        regions: &[Region],
        regions_per_run: Option<usize>,
        rng: &mut R,
    ) -> Result<RunSummary, RunError> {
        if regions.is_empty() {
            return Err(ConfigError::NoRegions.into());
        }
        let selected: Vec<&Region> = match regions_per_run {
            Some(k) => {
                let mut picked: Vec<&Region> = regions.choose_multiple(rng, k).collect();
                picked.shuffle(rng);
                picked
            }
            None => regions.iter().collect(),
        };
        info!(
            "sampling {} of {} region(s)",
            selected.len(),
            regions.len()
        );

        let mut summary = RunSummary::default();
        for region in selected {
            let report = self.sample_region(region, rng)?;
            summary.regions.push(report);
        }
        Ok(summary)
    }
}
