use std::path::PathBuf;

use thiserror::Error;

/// Invalid configuration. Fatal: detected before any item is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("phase '{name}' has weight {weight}, expected a value in (0, 1]")]
    WeightOutOfRange { name: String, weight: f64 },
    #[error("phase weights sum to {sum}, expected 1")]
    WeightSum { sum: f64 },
    #[error("phase plan has no '{0}' phase")]
    MissingPhase(String),
    #[error("phase '{0}' is declared more than once")]
    DuplicatePhase(String),
    #[error("mode '{0}' requires a speaker diarizer")]
    MissingDiarizer(String),
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}
