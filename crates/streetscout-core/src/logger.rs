//! Minimal stderr logger.
//!
//! Prints `[elapsed LEVEL target] message`. Install it once at startup with
//! [`init_with_level`], or map CLI verbosity flags through
//! [`level_from_verbosity`] first. With the `tracing` feature,
//! `init_tracing` installs a `tracing-subscriber` pipeline instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let target = record.target().split("::").next().unwrap_or_default();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:8.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            target,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Map `-v` / `-q` occurrence counts onto a level filter, `Info` at zero.
pub fn level_from_verbosity(verbose: u8, quiet: u8) -> LevelFilter {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install a `tracing` subscriber on stderr instead of the plain logger.
///
/// `RUST_LOG` wins when set; otherwise events at `default_level` and above
/// are shown. `log` records are bridged into the subscriber. Region spans
/// are reported when they close, so each line carries the region's wall
/// time. Returns `false` when a global subscriber was already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: LevelFilter) -> bool {
    let fallback = default_level.as_str().to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let installed = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0, 0), LevelFilter::Info);
        assert_eq!(level_from_verbosity(1, 0), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(3, 0), LevelFilter::Trace);
        assert_eq!(level_from_verbosity(0, 1), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(0, 4), LevelFilter::Error);
        assert_eq!(level_from_verbosity(2, 2), LevelFilter::Info);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn tracing_installs_once() {
        assert!(init_tracing(false, LevelFilter::Debug));
        assert!(!init_tracing(true, LevelFilter::Info));
        log::info!("bridged through the subscriber");
    }
}
