use std::path::Path;

use super::json_source::{run_json_command, SourceError};
use crate::transcript::domain::speech_recognizer::{RecognizerError, SpeechRecognizer};
use crate::transcript::domain::transcript::Segment;

/// Runs an external ASR program and reads segments from its stdout.
///
/// `{audio}` in any argument is replaced by the audio path. The program must
/// print a JSON array of `{start, end, text, words?}`.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds from `[program, args...]`. Returns `None` for an empty command.
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn transcribe(
        &self,
        audio: &Path,
        progress: &dyn Fn(f64),
    ) -> Result<Vec<Segment>, RecognizerError> {
        let segments =
            run_json_command(&self.program, &self.args, audio, &[]).map_err(|e| match e {
                SourceError::Missing(msg) => RecognizerError::ModelUnavailable(msg),
                SourceError::Failed(msg) => RecognizerError::TranscriptionFailed(msg),
            })?;
        progress(1.0);
        Ok(segments)
    }
}
