use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use streetscout::{
    init_with_level, level_from_verbosity, score_image, ApiKey, ConfigError, DirectorySink,
    MemorySink, ProviderError, RegionOutcome, RegionSampler, RunError, RunSummary,
    SamplerConfig, StreetViewClient,
};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("failed to build HTTP client: {0}")]
    Provider(#[from] ProviderError),
    #[error("{}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Parser)]
#[command(name = "streetscout", version)]
#[command(about = "Sample street-level panoramas and keep the most street-like view per city")]
struct Cli {
    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    /// Log through a tracing subscriber in the given format; RUST_LOG
    /// overrides -v/-q
    #[cfg(feature = "tracing")]
    #[arg(long, value_enum, global = true)]
    trace: Option<TraceFormat>,

    #[command(subcommand)]
    command: Command,
}

#[cfg(feature = "tracing")]
#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum TraceFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Sample regions and write accepted views
    Run(RunArgs),
    /// Print the quality score of local images
    Score(ScoreArgs),
    /// Write the default configuration as JSON
    InitConfig {
        /// Destination file
        file: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// JSON config file; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output root directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Seed for the random source
    #[arg(long)]
    seed: Option<u64>,

    /// Number of distinct regions to draw (at least 1)
    #[arg(long)]
    regions: Option<usize>,

    /// Run every configured region in order
    #[arg(long, conflicts_with = "regions")]
    all_regions: bool,

    /// Attempt budget per region
    #[arg(long)]
    attempts: Option<usize>,

    /// Acceptance threshold in [0, 1]
    #[arg(long)]
    threshold: Option<f32>,

    /// API key; falls back to the GCP_API_KEY environment variable
    #[arg(long)]
    api_key: Option<String>,

    /// Keep accepted views in memory instead of writing them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct ScoreArgs {
    /// Images to score
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// JSON config whose quality parameters are used
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one JSON object per image
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Score(args) => score(args),
        Command::InitConfig { file } => init_config(file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level: LevelFilter = level_from_verbosity(cli.verbose, cli.quiet);
    #[cfg(feature = "tracing")]
    if let Some(format) = cli.trace {
        streetscout::init_tracing(format == TraceFormat::Json, level);
        return;
    }
    let _ = init_with_level(level);
}

fn load_config(path: Option<&PathBuf>) -> Result<SamplerConfig, ConfigError> {
    match path {
        Some(p) => SamplerConfig::load_json(p),
        None => Ok(SamplerConfig::default()),
    }
}

fn run(args: RunArgs) -> Result<(), CliError> {
    let key = ApiKey::resolve(args.api_key.clone())?;

    let mut config = load_config(args.config.as_ref())?;
    if let Some(out) = args.out {
        config.output_dir = out;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.all_regions {
        config.regions_per_run = None;
    } else if let Some(k) = args.regions {
        config.regions_per_run = Some(k);
    }
    if let Some(n) = args.attempts {
        config.sampling.attempts_per_region = n;
    }
    if let Some(t) = args.threshold {
        config.quality.acceptance_threshold = t;
    }
    config.validate()?;

    let provider = StreetViewClient::from_config(key, &config)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let summary = if args.dry_run {
        let mut sampler = RegionSampler::from_config(provider, MemorySink::new(), &config)?;
        sampler
            .run(&config.regions, config.regions_per_run, &mut rng)
            .map_err(CliError::from)?
    } else {
        let sink = DirectorySink::new(&config.output_dir).with_jpeg_quality(config.jpeg_quality);
        let mut sampler = RegionSampler::from_config(provider, sink, &config)?;
        sampler
            .run(&config.regions, config.regions_per_run, &mut rng)
            .map_err(CliError::from)?
    };

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    for report in &summary.regions {
        match &report.outcome {
            RegionOutcome::Accepted { path, score, .. } => {
                println!("{} ({}): {} [{score:.3}]", report.region, report.city, path.display());
            }
            RegionOutcome::Exhausted => {
                println!(
                    "{} ({}): exhausted after {} attempt(s)",
                    report.region,
                    report.city,
                    report.attempts.len()
                );
            }
        }
    }
    info!(
        "done: {} region(s), {} accepted, {} exhausted",
        summary.regions.len(),
        summary.accepted(),
        summary.exhausted()
    );
}

fn score(args: ScoreArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_ref())?;
    config.quality.validate().map_err(ConfigError::from)?;

    for path in &args.images {
        let img = image::open(path)
            .map_err(|source| CliError::Image {
                path: path.clone(),
                source,
            })?
            .to_rgb8();
        let b = score_image(&img, &config.quality);
        let meaningful = config.quality.accepts(b.score);
        if args.json {
            let line = serde_json::json!({
                "path": path.display().to_string(),
                "meaningful": meaningful,
                "breakdown": b,
            });
            println!("{}", serde_json::to_string(&line)?);
        } else {
            println!(
                "{}: score {:.3} ({}) sharpness {:.3} lower {:.3} lower-upper {:.3} vertical {:.3} penalty x{:.3}",
                path.display(),
                b.score,
                if meaningful { "meaningful" } else { "rejected" },
                b.sharpness,
                b.lower_density,
                b.lower_minus_upper,
                b.vertical_ratio,
                b.penalty_factor
            );
        }
    }
    Ok(())
}

fn init_config(file: PathBuf) -> Result<(), CliError> {
    SamplerConfig::default().write_json(&file)?;
    info!("wrote {}", file.display());
    Ok(())
}
