use std::path::Path;

use thiserror::Error;

use super::transcript::Turn;

#[derive(Error, Debug)]
pub enum DiarizerError {
    /// Required credential is absent. Fatal for the whole batch.
    #[error("diarization credential missing: {0}")]
    AuthMissing(String),
    #[error("diarization failed: {0}")]
    DiarizationFailed(String),
}

/// Domain interface for speaker diarization.
///
/// Turns may overlap and need not be sorted.
pub trait SpeakerDiarizer: Send + Sync {
    fn diarize(&self, audio: &Path, progress: &dyn Fn(f64)) -> Result<Vec<Turn>, DiarizerError>;

    /// Verifies credentials before any audio is processed. Default: ready.
    fn check_ready(&self) -> Result<(), DiarizerError> {
        Ok(())
    }
}
