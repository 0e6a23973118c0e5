use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config_error::ConfigError;
use super::constants::{
    DEFAULT_ALIGN_WEIGHT, DEFAULT_DIARIZE_WEIGHT, DEFAULT_SIMPLE_TRANSCRIBE_WEIGHT,
    DEFAULT_TRANSCRIBE_WEIGHT, PHASE_ALIGN, PHASE_DIARIZE, PHASE_TRANSCRIBE,
};
use crate::alignment::domain::speaker_aligner::MatchMode;
use crate::alignment::domain::tie_break::TieBreakPolicy;
use crate::pipeline::phase_plan::{Phase, PhasePlan};
use crate::transcript::domain::mode::Mode;

/// Batch settings persisted as JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tie_break: TieBreakPolicy,
    pub match_mode: MatchMode,
    pub workers: usize,
    pub export_text: bool,
    pub with_speakers_phases: Vec<Phase>,
    pub simple_phases: Vec<Phase>,
    /// `[program, args...]`; `{audio}` is replaced by the input path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognizer_command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diarizer_command: Option<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tie_break: TieBreakPolicy::default(),
            match_mode: MatchMode::default(),
            workers: 1,
            export_text: false,
            with_speakers_phases: vec![
                Phase::new(PHASE_TRANSCRIBE, DEFAULT_TRANSCRIBE_WEIGHT),
                Phase::new(PHASE_DIARIZE, DEFAULT_DIARIZE_WEIGHT),
                Phase::new(PHASE_ALIGN, DEFAULT_ALIGN_WEIGHT),
            ],
            simple_phases: vec![
                Phase::new(PHASE_TRANSCRIBE, DEFAULT_SIMPLE_TRANSCRIBE_WEIGHT),
                Phase::new(PHASE_ALIGN, DEFAULT_ALIGN_WEIGHT),
            ],
            recognizer_command: None,
            diarizer_command: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Diarscribe").join("settings.json"))
    }

    /// Loads the per-user settings file, falling back to defaults when it
    /// is absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{e}; using default settings");
            Self::default()
        })
    }

    /// Loads an explicitly named settings file. Any failure is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn phases_for(&self, mode: Mode) -> &[Phase] {
        match mode {
            Mode::Simple => &self.simple_phases,
            Mode::WithSpeakers => &self.with_speakers_phases,
        }
    }

    pub fn plan_for(&self, mode: Mode) -> Result<PhasePlan, ConfigError> {
        PhasePlan::new(self.phases_for(mode).to_vec())
    }
}
