use std::path::{Path, PathBuf};

use super::json_source::{read_json_file, SourceError};
use crate::shared::constants::TURNS_SIDECAR_SUFFIX;
use crate::transcript::domain::speaker_diarizer::{DiarizerError, SpeakerDiarizer};
use crate::transcript::domain::transcript::Turn;

/// Reads turns an external diarization tool already wrote next to the audio.
///
/// For `audio/talk.wav` it expects `<dir>/talk.turns.json` holding a JSON
/// array of `{start, end, speaker}`.
#[derive(Debug)]
pub struct SidecarDiarizer {
    dir: PathBuf,
}

impl SidecarDiarizer {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn sidecar_path(&self, audio: &Path) -> PathBuf {
        let stem = audio.file_stem().unwrap_or_default().to_string_lossy();
        self.dir.join(format!("{stem}.{TURNS_SIDECAR_SUFFIX}"))
    }
}

impl SpeakerDiarizer for SidecarDiarizer {
    fn diarize(&self, audio: &Path, progress: &dyn Fn(f64)) -> Result<Vec<Turn>, DiarizerError> {
        let turns = read_json_file(&self.sidecar_path(audio)).map_err(|e| match e {
            SourceError::Missing(msg) | SourceError::Failed(msg) => {
                DiarizerError::DiarizationFailed(msg)
            }
        })?;
        progress(1.0);
        Ok(turns)
    }
}
