use std::cell::RefCell;
use std::path::PathBuf;

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use streetscout::{
    default_regions, score_image, AttemptOutcome, BoundingBox, Coordinate, DirectorySink,
    MemorySink, PanoramaId, PanoramaProvider, QualityParams, Region, RegionOutcome,
    RegionSampler, RunError, SampleSink, SamplingParams, SinkError, ViewRequest,
};

/// Scripted provider: resolves only at the listed radii and renders the
/// image registered for a heading, recording every call.
#[derive(Default)]
struct FakeProvider {
    resolve_radii: Vec<u32>,
    views: Vec<(f64, RgbImage)>,
    resolves: RefCell<Vec<u32>>,
    fetches: RefCell<Vec<(PanoramaId, f64)>>,
}

impl FakeProvider {
    fn new(resolve_radii: &[u32]) -> Self {
        Self {
            resolve_radii: resolve_radii.to_vec(),
            ..Self::default()
        }
    }

    fn with_view(mut self, heading_deg: f64, image: RgbImage) -> Self {
        self.views.push((heading_deg, image));
        self
    }

    fn with_all_headings(self, image: &RgbImage) -> Self {
        [0.0, 90.0, 180.0, 270.0]
            .into_iter()
            .fold(self, |p, h| p.with_view(h, image.clone()))
    }
}

impl PanoramaProvider for FakeProvider {
    fn resolve_panorama(&self, _at: Coordinate, radius_m: u32) -> Option<PanoramaId> {
        self.resolves.borrow_mut().push(radius_m);
        self.resolve_radii
            .contains(&radius_m)
            .then(|| PanoramaId(format!("p-{radius_m}")))
    }

    fn fetch_image(&self, pano: &PanoramaId, view: &ViewRequest) -> Option<RgbImage> {
        self.fetches
            .borrow_mut()
            .push((pano.clone(), view.heading_deg));
        self.views
            .iter()
            .find(|(h, _)| *h == view.heading_deg)
            .map(|(_, img)| img.clone())
    }
}

struct FailingSink;

impl SampleSink for FailingSink {
    fn persist(
        &mut self,
        _city: &str,
        at: Coordinate,
        _raster: &RgbImage,
    ) -> Result<PathBuf, SinkError> {
        Err(SinkError::Write {
            path: PathBuf::from(at.to_fixed5()),
            source: std::io::Error::other("disk full"),
        })
    }
}

fn flat() -> RgbImage {
    RgbImage::from_pixel(64, 64, Rgb([120, 120, 120]))
}

/// Full-frame noise: maximal sharpness, so at least the sharpness weight
/// survives even the largest wall penalty.
fn textured(seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(64, 64, |_, _| {
        let v: u8 = rng.random();
        Rgb([v, v, v])
    })
}

fn test_region() -> Region {
    Region::new(
        "Western Europe",
        "London",
        BoundingBox::new(51.45, 51.55, -0.2, -0.1).expect("bbox"),
    )
}

fn quality_with_threshold(threshold: f32) -> QualityParams {
    QualityParams {
        acceptance_threshold: threshold,
        ..QualityParams::default()
    }
}

#[test]
fn no_coverage_uses_both_radii_every_attempt() {
    let provider = FakeProvider::new(&[]);
    let mut sampler = RegionSampler::new(
        &provider,
        MemorySink::new(),
        SamplingParams::default(),
        QualityParams::default(),
    );
    let mut rng = StdRng::seed_from_u64(1);
    let report = sampler
        .sample_region(&test_region(), &mut rng)
        .expect("report");

    assert_eq!(report.outcome, RegionOutcome::Exhausted);
    assert_eq!(report.attempts.len(), 5);
    assert!(report
        .attempts
        .iter()
        .all(|a| a.outcome == AttemptOutcome::NoPanorama && a.radius_m.is_none()));
    assert_eq!(*provider.resolves.borrow(), [60u32, 200].repeat(5));
    assert!(provider.fetches.borrow().is_empty());
    assert!(sampler.sink().samples.is_empty());
}

#[test]
fn best_heading_is_the_one_persisted() {
    let provider = FakeProvider::new(&[60])
        .with_view(0.0, flat())
        .with_view(90.0, flat())
        .with_view(180.0, textured(7))
        .with_view(270.0, flat());
    let mut sampler = RegionSampler::new(
        &provider,
        MemorySink::new(),
        SamplingParams::default(),
        quality_with_threshold(0.2),
    );
    let mut rng = StdRng::seed_from_u64(2);
    let region = test_region();
    let report = sampler.sample_region(&region, &mut rng).expect("report");

    let RegionOutcome::Accepted {
        coordinate,
        heading_deg,
        score,
        path,
    } = &report.outcome
    else {
        panic!("expected acceptance, got {:?}", report.outcome);
    };
    assert_eq!(*heading_deg, 180.0);
    assert!(*score >= 0.2);
    assert!(region.bbox.contains(*coordinate));
    assert_eq!(
        *path,
        PathBuf::from("London").join(format!("{}.jpg", coordinate.to_fixed5()))
    );

    // One attempt, every heading rendered once, exactly one sample stored.
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(provider.fetches.borrow().len(), 4);
    let samples = &sampler.sink().samples;
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].city, "London");
    assert_eq!(samples[0].raster, textured(7));
}

#[test]
fn highest_of_four_qualifying_headings_wins() {
    let quality = quality_with_threshold(0.2);
    let views: Vec<(f64, RgbImage)> = [0.0, 90.0, 180.0, 270.0]
        .into_iter()
        .zip(11u64..)
        .map(|(h, seed)| (h, textured(seed)))
        .collect();
    let scores: Vec<f32> = views
        .iter()
        .map(|(_, img)| score_image(img, &quality).score)
        .collect();
    assert!(scores.iter().all(|&s| s >= quality.acceptance_threshold));
    let max = scores.iter().copied().fold(f32::MIN, f32::max);

    let provider = views
        .into_iter()
        .fold(FakeProvider::new(&[60]), |p, (h, img)| p.with_view(h, img));
    let mut sampler = RegionSampler::new(
        &provider,
        MemorySink::new(),
        SamplingParams::default(),
        quality,
    );
    let mut rng = StdRng::seed_from_u64(21);
    let report = sampler
        .sample_region(&test_region(), &mut rng)
        .expect("report");

    let RegionOutcome::Accepted { score, .. } = report.outcome else {
        panic!("expected acceptance, got {:?}", report.outcome);
    };
    assert_eq!(score, max);
    let samples = &sampler.sink().samples;
    assert_eq!(samples.len(), 1);
    assert_eq!(score_image(&samples[0].raster, &quality).score, max);
}

#[test]
fn fallback_radius_feeds_the_same_attempt() {
    let provider = FakeProvider::new(&[200]).with_all_headings(&textured(1));
    let mut sampler = RegionSampler::new(
        &provider,
        MemorySink::new(),
        SamplingParams::default(),
        quality_with_threshold(0.2),
    );
    let mut rng = StdRng::seed_from_u64(3);
    let report = sampler
        .sample_region(&test_region(), &mut rng)
        .expect("report");

    assert!(report.is_accepted());
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(report.attempts[0].radius_m, Some(200));
    assert_eq!(*provider.resolves.borrow(), vec![60, 200]);
    assert!(provider
        .fetches
        .borrow()
        .iter()
        .all(|(pano, _)| pano.as_str() == "p-200"));
}

#[test]
fn ties_go_to_the_first_heading_visited() {
    let provider = FakeProvider::new(&[60]).with_all_headings(&flat());
    let mut sampler = RegionSampler::new(
        &provider,
        MemorySink::new(),
        SamplingParams::default(),
        quality_with_threshold(0.0),
    );
    let mut rng = StdRng::seed_from_u64(4);
    let report = sampler
        .sample_region(&test_region(), &mut rng)
        .expect("report");

    let RegionOutcome::Accepted { heading_deg, .. } = report.outcome else {
        panic!("threshold 0 accepts any view");
    };
    let order = &report.attempts[0].heading_order;
    assert_eq!(order.len(), 4);
    assert_eq!(heading_deg, order[0]);
    let fetched: Vec<f64> = provider.fetches.borrow().iter().map(|(_, h)| *h).collect();
    assert_eq!(&fetched, order);
}

#[test]
fn below_threshold_views_are_never_written() {
    let provider = FakeProvider::new(&[60]).with_all_headings(&flat());
    let mut sampler = RegionSampler::new(
        &provider,
        MemorySink::new(),
        SamplingParams::default(),
        QualityParams::default(),
    );
    let mut rng = StdRng::seed_from_u64(5);
    let report = sampler
        .sample_region(&test_region(), &mut rng)
        .expect("report");

    assert_eq!(report.outcome, RegionOutcome::Exhausted);
    assert_eq!(report.best_score(), Some(0.0));
    assert_eq!(provider.fetches.borrow().len(), 5 * 4);
    assert!(sampler.sink().samples.is_empty());
}

#[test]
fn missing_imagery_is_not_fatal() {
    let provider = FakeProvider::new(&[60]);
    let params = SamplingParams {
        attempts_per_region: 3,
        ..SamplingParams::default()
    };
    let mut sampler = RegionSampler::new(
        &provider,
        MemorySink::new(),
        params,
        QualityParams::default(),
    );
    let mut rng = StdRng::seed_from_u64(6);
    let report = sampler
        .sample_region(&test_region(), &mut rng)
        .expect("report");

    assert_eq!(report.outcome, RegionOutcome::Exhausted);
    assert_eq!(report.attempts.len(), 3);
    assert!(report
        .attempts
        .iter()
        .all(|a| matches!(a.outcome, AttemptOutcome::NoImagery { .. })));
    assert_eq!(report.best_score(), None);
}

#[test]
fn same_seed_replays_the_same_run() {
    let run = |seed: u64| {
        let provider = FakeProvider::new(&[200]).with_all_headings(&flat());
        let mut sampler = RegionSampler::new(
            &provider,
            MemorySink::new(),
            SamplingParams::default(),
            QualityParams::default(),
        );
        let mut rng = StdRng::seed_from_u64(seed);
        sampler
            .run(&default_regions(), Some(3), &mut rng)
            .expect("summary")
    };

    let a = run(99);
    let b = run(99);
    assert_eq!(a, b);

    let c = run(100);
    let coords = |s: &streetscout::RunSummary| -> Vec<Coordinate> {
        s.regions
            .iter()
            .flat_map(|r| r.attempts.iter().map(|a| a.coordinate))
            .collect()
    };
    assert_ne!(coords(&a), coords(&c));
}

#[test]
fn region_subset_is_distinct_and_bounded() {
    let provider = FakeProvider::new(&[]);
    let mut sampler = RegionSampler::new(
        &provider,
        MemorySink::new(),
        SamplingParams::default(),
        QualityParams::default(),
    );
    let catalog = default_regions();
    let mut rng = StdRng::seed_from_u64(7);

    let summary = sampler.run(&catalog, Some(4), &mut rng).expect("summary");
    assert_eq!(summary.regions.len(), 4);
    let mut names: Vec<&str> = summary.regions.iter().map(|r| r.region.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 4);
    for report in &summary.regions {
        let region = catalog
            .iter()
            .find(|r| r.name == report.region)
            .expect("known region");
        assert!(report
            .attempts
            .iter()
            .all(|a| region.bbox.contains(a.coordinate)));
    }

    let all = sampler.run(&catalog, None, &mut rng).expect("summary");
    let order: Vec<&str> = all.regions.iter().map(|r| r.region.as_str()).collect();
    let expected: Vec<&str> = catalog.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, expected);
    assert_eq!(all.exhausted(), catalog.len());
}

#[test]
fn sink_failure_aborts_the_run() {
    let provider = FakeProvider::new(&[60]).with_all_headings(&textured(2));
    let mut sampler = RegionSampler::new(
        &provider,
        FailingSink,
        SamplingParams::default(),
        quality_with_threshold(0.2),
    );
    let mut rng = StdRng::seed_from_u64(8);
    let err = sampler
        .run(&default_regions(), None, &mut rng)
        .unwrap_err();
    assert!(matches!(err, RunError::Sink(SinkError::Write { .. })));
    // The first region failed; nothing further was resolved.
    assert_eq!(*provider.resolves.borrow(), vec![60]);
}

#[test]
fn directory_sink_receives_one_file_per_accepted_region() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let provider = FakeProvider::new(&[60]).with_all_headings(&textured(3));
    let mut sampler = RegionSampler::new(
        &provider,
        DirectorySink::new(tmp.path()),
        SamplingParams::default(),
        quality_with_threshold(0.2),
    );
    let mut rng = StdRng::seed_from_u64(9);
    let regions = vec![
        test_region(),
        Region::new(
            "North America",
            "New York",
            BoundingBox::new(40.7, 40.8, -74.05, -73.95).expect("bbox"),
        ),
    ];
    let summary = sampler.run(&regions, None, &mut rng).expect("summary");

    assert_eq!(summary.accepted(), 2);
    let paths = summary.written_paths();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].starts_with(tmp.path().join("London")));
    assert!(paths[1].starts_with(tmp.path().join("New_York")));
    for path in paths {
        assert!(path.is_file());
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.matches(',').count(), 1);
    }
}
