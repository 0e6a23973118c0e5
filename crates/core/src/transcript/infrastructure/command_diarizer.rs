use std::path::Path;

use super::json_source::{run_json_command, SourceError};
use crate::shared::constants::HF_TOKEN_VARS;
use crate::transcript::domain::speaker_diarizer::{DiarizerError, SpeakerDiarizer};
use crate::transcript::domain::transcript::Turn;

/// First non-empty Hugging Face token found in the environment.
pub fn hf_token_from_env() -> Option<String> {
    HF_TOKEN_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

/// Runs an external diarization program and reads turns from its stdout.
///
/// The Hugging Face token is forwarded to the child as `HUGGINGFACE_TOKEN`.
/// The program must print a JSON array of `{start, end, speaker}`.
#[derive(Clone)]
pub struct CommandDiarizer {
    program: String,
    args: Vec<String>,
    token: Option<String>,
}

impl CommandDiarizer {
    pub fn new(program: impl Into<String>, args: Vec<String>, token: Option<String>) -> Self {
        Self {
            program: program.into(),
            args,
            token,
        }
    }

    /// Builds from `[program, args...]`. Returns `None` for an empty command.
    pub fn from_command_line(command: &[String], token: Option<String>) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), token))
    }

    fn token(&self) -> Result<&str, DiarizerError> {
        self.token.as_deref().ok_or_else(|| {
            DiarizerError::AuthMissing(format!(
                "set {} to a Hugging Face access token",
                HF_TOKEN_VARS.join(" or ")
            ))
        })
    }
}

impl std::fmt::Debug for CommandDiarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDiarizer")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SpeakerDiarizer for CommandDiarizer {
    fn diarize(&self, audio: &Path, progress: &dyn Fn(f64)) -> Result<Vec<Turn>, DiarizerError> {
        let token = self.token()?;
        let turns = run_json_command(
            &self.program,
            &self.args,
            audio,
            &[(HF_TOKEN_VARS[0], token)],
        )
        .map_err(|e| match e {
            SourceError::Missing(msg) | SourceError::Failed(msg) => {
                DiarizerError::DiarizationFailed(msg)
            }
        })?;
        progress(1.0);
        Ok(turns)
    }

    fn check_ready(&self) -> Result<(), DiarizerError> {
        self.token().map(|_| ())
    }
}
