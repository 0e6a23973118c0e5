use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use env_logger::Env;

use diarscribe_core::alignment::domain::speaker_aligner::{MatchMode, SpeakerAligner};
use diarscribe_core::alignment::domain::tie_break::{create_tie_break, TieBreakPolicy};
use diarscribe_core::output::infrastructure::directory_artifact_store::DirectoryArtifactStore;
use diarscribe_core::pipeline::batch_executor::{BatchExecutor, SequentialBatchExecutor};
use diarscribe_core::pipeline::infrastructure::audio_scanner;
use diarscribe_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use diarscribe_core::pipeline::progress_sink::LogProgressSink;
use diarscribe_core::pipeline::transcribe_batch_use_case::{BatchConfig, TranscribeBatchUseCase};
use diarscribe_core::shared::config_error::ConfigError;
use diarscribe_core::shared::settings::Settings;
use diarscribe_core::transcript::domain::mode::Mode;
use diarscribe_core::transcript::domain::speaker_diarizer::SpeakerDiarizer;
use diarscribe_core::transcript::domain::speech_recognizer::SpeechRecognizer;
use diarscribe_core::transcript::infrastructure::command_diarizer::{
    hf_token_from_env, CommandDiarizer,
};
use diarscribe_core::transcript::infrastructure::command_recognizer::CommandRecognizer;
use diarscribe_core::transcript::infrastructure::sidecar_diarizer::SidecarDiarizer;
use diarscribe_core::transcript::infrastructure::sidecar_recognizer::SidecarRecognizer;

/// Speaker-attributed transcription for a directory of audio files.
#[derive(Parser)]
#[command(name = "diarscribe")]
struct Cli {
    /// Directory containing audio files (wav, mp3, m4a, flac).
    #[arg(long, default_value = "audio")]
    input_dir: PathBuf,

    /// Directory that receives the transcripts.
    #[arg(long, default_value = "transcripts")]
    output_dir: PathBuf,

    /// Transcribe only, without speaker labels.
    #[arg(long)]
    simple: bool,

    /// Directory with <stem>.segments.json and <stem>.turns.json
    /// (defaults to the input directory).
    #[arg(long)]
    sidecar_dir: Option<PathBuf>,

    /// External ASR command printing segments as JSON; {audio} is replaced
    /// by the file path.
    #[arg(long)]
    asr_command: Option<String>,

    /// External diarization command printing turns as JSON; {audio} is
    /// replaced by the file path.
    #[arg(long)]
    diarize_command: Option<String>,

    /// Speaker choice when two turns overlap a segment equally:
    /// first, shortest or earliest.
    #[arg(long)]
    tie_break: Option<TieBreakPolicy>,

    /// Emit one entry per speaker turn built from word timings.
    #[arg(long)]
    word_level: bool,

    /// Number of files processed in parallel.
    #[arg(long)]
    workers: Option<usize>,

    /// Also write a plain-text transcript next to each JSON file.
    #[arg(long)]
    text: bool,

    /// Settings file (defaults to the per-user settings).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = load_settings(&cli)?;
    let mode = if cli.simple {
        Mode::Simple
    } else {
        Mode::WithSpeakers
    };

    let sources = audio_scanner::scan(&cli.input_dir)?;
    if sources.is_empty() {
        log::info!("No audio files found in {}", cli.input_dir.display());
        return Ok(());
    }

    let sidecar_dir = cli.sidecar_dir.as_deref().unwrap_or(&cli.input_dir);
    let use_case = build_use_case(&settings, mode, sidecar_dir, &cli.output_dir)?;
    let report = use_case.execute(&sources)?;

    if report.failed() > 0 {
        log::warn!(
            "{} of {} files failed; re-run to retry them",
            report.failed(),
            report.items.len()
        );
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input_dir.is_dir() {
        return Err(format!("Input directory not found: {}", cli.input_dir.display()).into());
    }
    if cli.workers == Some(0) {
        return Err("Workers must be at least 1".into());
    }
    if let Some(dir) = &cli.sidecar_dir {
        if !dir.is_dir() {
            return Err(format!("Sidecar directory not found: {}", dir.display()).into());
        }
    }
    for (flag, value) in [
        ("--asr-command", &cli.asr_command),
        ("--diarize-command", &cli.diarize_command),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(format!("{flag} must not be empty").into());
        }
    }
    Ok(())
}

/// Settings file first, then command-line overrides.
fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };

    if let Some(policy) = cli.tie_break {
        settings.tie_break = policy;
    }
    if cli.word_level {
        settings.match_mode = MatchMode::Word;
    }
    if let Some(workers) = cli.workers {
        settings.workers = workers;
    }
    if cli.text {
        settings.export_text = true;
    }
    if let Some(command) = &cli.asr_command {
        settings.recognizer_command = Some(split_command(command));
    }
    if let Some(command) = &cli.diarize_command {
        settings.diarizer_command = Some(split_command(command));
    }
    Ok(settings)
}

/// Splits a command on whitespace. No shell quoting is applied.
fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

fn build_use_case(
    settings: &Settings,
    mode: Mode,
    sidecar_dir: &Path,
    output_dir: &Path,
) -> Result<TranscribeBatchUseCase, Box<dyn std::error::Error>> {
    let recognizer = build_recognizer(settings, sidecar_dir);
    let diarizer = if mode.requires_diarization() {
        Some(build_diarizer(settings, sidecar_dir))
    } else {
        None
    };
    let aligner = SpeakerAligner::new(settings.match_mode, create_tie_break(settings.tie_break));
    let store = DirectoryArtifactStore::open(output_dir)?;
    let executor: Box<dyn BatchExecutor> = if settings.workers > 1 {
        log::info!("Processing with {} workers", settings.workers);
        Box::new(ThreadedBatchExecutor::new(settings.workers))
    } else {
        Box::new(SequentialBatchExecutor)
    };
    let config = BatchConfig {
        mode,
        plan: settings.plan_for(mode)?,
        export_text: settings.export_text,
    };

    Ok(TranscribeBatchUseCase::new(
        recognizer,
        diarizer,
        aligner,
        Box::new(store),
        Box::new(LogProgressSink::default()),
        executor,
        config,
    )?)
}

fn build_recognizer(settings: &Settings, sidecar_dir: &Path) -> Box<dyn SpeechRecognizer> {
    match settings
        .recognizer_command
        .as_deref()
        .and_then(CommandRecognizer::from_command_line)
    {
        Some(recognizer) => {
            log::info!("Transcribing with {}", recognizer.program());
            Box::new(recognizer)
        }
        None => {
            log::info!("Reading segments from {}", sidecar_dir.display());
            Box::new(SidecarRecognizer::new(sidecar_dir))
        }
    }
}

fn build_diarizer(settings: &Settings, sidecar_dir: &Path) -> Box<dyn SpeakerDiarizer> {
    match settings
        .diarizer_command
        .as_deref()
        .and_then(|command| CommandDiarizer::from_command_line(command, hf_token_from_env()))
    {
        Some(diarizer) => Box::new(diarizer),
        None => {
            log::info!("Reading speaker turns from {}", sidecar_dir.display());
            Box::new(SidecarDiarizer::new(sidecar_dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("diarscribe").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.input_dir, PathBuf::from("audio"));
        assert_eq!(cli.output_dir, PathBuf::from("transcripts"));
        assert!(!cli.simple);
        assert!(cli.tie_break.is_none());
    }

    #[test]
    fn test_tie_break_flag_parsed() {
        let cli = parse(&["--tie-break", "shortest"]);
        assert_eq!(cli.tie_break, Some(TieBreakPolicy::Shortest));
    }

    #[test]
    fn test_unknown_tie_break_rejected() {
        let result = Cli::try_parse_from(["diarscribe", "--tie-break", "loudest"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_split_command() {
        assert_eq!(
            split_command("  whisper-json --model base {audio} "),
            vec!["whisper-json", "--model", "base", "{audio}"]
        );
    }

    #[test]
    fn test_flags_override_settings_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, r#"{"workers": 2, "tie_break": "earliest"}"#).unwrap();

        let cli = parse(&[
            "--config",
            path.to_str().unwrap(),
            "--workers",
            "6",
            "--word-level",
            "--asr-command",
            "asr {audio}",
        ]);
        let settings = load_settings(&cli).unwrap();

        assert_eq!(settings.workers, 6);
        assert_eq!(settings.tie_break, TieBreakPolicy::Earliest);
        assert_eq!(settings.match_mode, MatchMode::Word);
        assert_eq!(
            settings.recognizer_command,
            Some(vec!["asr".to_string(), "{audio}".to_string()])
        );
    }

    #[test]
    fn test_missing_config_file_is_fatal() {
        let cli = parse(&["--config", "/nonexistent/diarscribe/settings.json"]);
        assert!(matches!(load_settings(&cli), Err(ConfigError::Read { .. })));
    }
}
