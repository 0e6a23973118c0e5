use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::de::DeserializeOwned;

use crate::shared::constants::AUDIO_PLACEHOLDER;

/// Why an external JSON producer gave no usable output.
#[derive(Debug)]
pub(crate) enum SourceError {
    /// The file or program does not exist.
    Missing(String),
    /// It exists but failed or produced invalid JSON.
    Failed(String),
}

pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        let msg = format!("{}: {e}", path.display());
        if e.kind() == ErrorKind::NotFound {
            SourceError::Missing(msg)
        } else {
            SourceError::Failed(msg)
        }
    })?;
    serde_json::from_str(&text)
        .map_err(|e| SourceError::Failed(format!("invalid JSON in {}: {e}", path.display())))
}

/// Runs `program args...` with `{audio}` substituted and parses its stdout.
pub(crate) fn run_json_command<T: DeserializeOwned>(
    program: &str,
    args: &[String],
    audio: &Path,
    envs: &[(&str, &str)],
) -> Result<T, SourceError> {
    let audio = audio.to_string_lossy();
    let args: Vec<String> = args
        .iter()
        .map(|a| a.replace(AUDIO_PLACEHOLDER, &audio))
        .collect();

    log::debug!("Running {program} {}", args.join(" "));
    let output = Command::new(program)
        .args(&args)
        .envs(envs.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            let msg = format!("{program}: {e}");
            if e.kind() == ErrorKind::NotFound {
                SourceError::Missing(msg)
            } else {
                SourceError::Failed(msg)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.lines().last().unwrap_or("").trim();
        return Err(SourceError::Failed(format!(
            "{program} exited with {}: {detail}",
            output.status
        )));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| SourceError::Failed(format!("{program} printed invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result: Result<Vec<u32>, _> = read_json_file(&tmp.path().join("nope.json"));
        assert!(matches!(result, Err(SourceError::Missing(_))));
    }

    #[test]
    fn test_read_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "[1, 2,").unwrap();
        let result: Result<Vec<u32>, _> = read_json_file(&path);
        assert!(matches!(result, Err(SourceError::Failed(msg)) if msg.contains("invalid JSON")));
    }

    #[test]
    fn test_missing_program() {
        let result: Result<Vec<u32>, _> = run_json_command(
            "diarscribe-no-such-program",
            &[],
            Path::new("a.wav"),
            &[],
        );
        assert!(matches!(result, Err(SourceError::Missing(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_audio_placeholder_substituted() {
        let tmp = TempDir::new().unwrap();
        let audio = tmp.path().join("talk.wav");
        fs::write(&audio, "[1, 2, 3]").unwrap();
        let args = vec![
            "-c".to_string(),
            "cat \"$1\"".to_string(),
            "sh".to_string(),
            "{audio}".to_string(),
        ];
        let values: Vec<u32> = run_json_command("sh", &args, &audio, &[]).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[cfg(unix)]
    #[test]
    fn test_env_forwarded() {
        let args = vec!["-c".to_string(), "printf '[\"%s\"]' \"$SECRET\"".to_string()];
        let values: Vec<String> =
            run_json_command("sh", &args, Path::new("a.wav"), &[("SECRET", "abc")]).unwrap();
        assert_eq!(values, vec!["abc".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_reports_stderr() {
        let args = vec!["-c".to_string(), "echo 'out of memory' >&2; exit 3".to_string()];
        let result: Result<Vec<u32>, _> = run_json_command("sh", &args, Path::new("a.wav"), &[]);
        assert!(matches!(result, Err(SourceError::Failed(msg)) if msg.contains("out of memory")));
    }
}
