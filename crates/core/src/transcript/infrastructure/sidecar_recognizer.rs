use std::path::{Path, PathBuf};

use super::json_source::{read_json_file, SourceError};
use crate::shared::constants::SEGMENTS_SIDECAR_SUFFIX;
use crate::transcript::domain::speech_recognizer::{RecognizerError, SpeechRecognizer};
use crate::transcript::domain::transcript::Segment;

/// Reads segments an external ASR tool already wrote next to the audio.
///
/// For `audio/talk.wav` it expects `<dir>/talk.segments.json` holding a JSON
/// array of `{start, end, text, words?}`.
#[derive(Debug)]
pub struct SidecarRecognizer {
    dir: PathBuf,
}

impl SidecarRecognizer {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn sidecar_path(&self, audio: &Path) -> PathBuf {
        let stem = audio.file_stem().unwrap_or_default().to_string_lossy();
        self.dir.join(format!("{stem}.{SEGMENTS_SIDECAR_SUFFIX}"))
    }
}

impl SpeechRecognizer for SidecarRecognizer {
    fn transcribe(
        &self,
        audio: &Path,
        progress: &dyn Fn(f64),
    ) -> Result<Vec<Segment>, RecognizerError> {
        let segments = read_json_file(&self.sidecar_path(audio)).map_err(|e| match e {
            SourceError::Missing(msg) => RecognizerError::ModelUnavailable(msg),
            SourceError::Failed(msg) => RecognizerError::TranscriptionFailed(msg),
        })?;
        progress(1.0);
        Ok(segments)
    }
}
