use crate::config::ConfigError;
use crate::sink::SinkError;

/// Failures that stop a whole run.
///
/// A region that never finds an acceptable view is not an error; it is
/// reported as [`crate::RegionOutcome::Exhausted`].
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
