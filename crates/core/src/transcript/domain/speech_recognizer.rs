use std::path::Path;

use thiserror::Error;

use super::transcript::Segment;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("speech recognition model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
}

/// Domain interface for speech-to-text transcription.
///
/// Implementations produce chronologically ordered segments, optionally with
/// nested word timing. `progress` accepts the local completion fraction in
/// `[0, 1]` and may be ignored.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(
        &self,
        audio: &Path,
        progress: &dyn Fn(f64),
    ) -> Result<Vec<Segment>, RecognizerError>;
}
