use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::transcript::domain::mode::Mode;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to check artifact {key}: {source}")]
    Check {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Deterministic identifier of a transcript artifact for `(source, mode)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    source: String,
    mode: Mode,
}

impl ArtifactKey {
    pub fn new(source: impl Into<String>, mode: Mode) -> Self {
        Self {
            source: source.into(),
            mode,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// File name of the structured artifact, e.g. `talk_with_speakers.json`.
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.source, self.mode)
    }

    /// File name of the line-oriented export, e.g. `talk_with_speakers.txt`.
    pub fn text_file_name(&self) -> String {
        format!("{}_{}.txt", self.source, self.mode)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Keyed storage for finished transcripts.
///
/// Existence of the structured artifact is the only completion marker the
/// batch orchestrator consults, so `write` must never leave a partial
/// artifact visible under its key.
pub trait ArtifactStore: Send + Sync {
    fn exists(&self, key: &ArtifactKey) -> Result<bool, StoreError>;

    /// Persists the structured artifact. Returns where it was stored.
    fn write(&self, key: &ArtifactKey, contents: &str) -> Result<String, StoreError>;

    /// Persists the line-oriented export. Does not mark completion.
    fn write_text(&self, key: &ArtifactKey, contents: &str) -> Result<String, StoreError>;
}
