use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Processing mode: determines both the pipeline phases and the output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Transcription only; records carry no speaker.
    Simple,
    /// Transcription plus diarization.
    WithSpeakers,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::WithSpeakers => "with_speakers",
        }
    }

    pub fn requires_diarization(&self) -> bool {
        matches!(self, Mode::WithSpeakers)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Mode::Simple),
            "with_speakers" => Ok(Mode::WithSpeakers),
            other => Err(format!(
                "mode must be 'simple' or 'with_speakers', got '{other}'"
            )),
        }
    }
}
