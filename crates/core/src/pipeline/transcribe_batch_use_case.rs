use std::collections::HashSet;
use std::time::Instant;

use thiserror::Error;

use super::batch_executor::{BatchError, BatchExecutor, BatchJob, ItemOutcome};
use super::phase_plan::{PhasePlan, ProgressTracker};
use super::progress_sink::ProgressSink;
use crate::alignment::domain::speaker_aligner::{AlignmentError, SpeakerAligner};
use crate::output::domain::artifact_store::{ArtifactKey, ArtifactStore, StoreError};
use crate::output::domain::transcript_formatter::{FormatError, TranscriptFormatter};
use crate::shared::config_error::ConfigError;
use crate::shared::constants::{PHASE_ALIGN, PHASE_DIARIZE, PHASE_TRANSCRIBE};
use crate::transcript::domain::audio_source::AudioSource;
use crate::transcript::domain::mode::Mode;
use crate::transcript::domain::speaker_diarizer::{DiarizerError, SpeakerDiarizer};
use crate::transcript::domain::speech_recognizer::{RecognizerError, SpeechRecognizer};

/// Per-item failure. Always isolated to its item.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),
    #[error(transparent)]
    Diarizer(#[from] DiarizerError),
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration for a batch run.
pub struct BatchConfig {
    pub mode: Mode,
    pub plan: PhasePlan,
    /// Also write the line-oriented transcript next to the JSON artifact.
    pub export_text: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemReport {
    pub source: String,
    pub key: ArtifactKey,
    pub outcome: ItemOutcome,
}

/// Outcome of every input, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn done(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Done(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

/// Transcribes a collection of audio files into speaker-attributed artifacts.
///
/// Per item: `Pending → Skipped` when the artifact exists, otherwise
/// `Running → Done | Failed`. Failures are logged and the batch moves on;
/// only configuration errors and a diarizer credential failure abort it.
pub struct TranscribeBatchUseCase {
    recognizer: Box<dyn SpeechRecognizer>,
    diarizer: Option<Box<dyn SpeakerDiarizer>>,
    aligner: SpeakerAligner,
    store: Box<dyn ArtifactStore>,
    sink: Box<dyn ProgressSink>,
    executor: Box<dyn BatchExecutor>,
    config: BatchConfig,
}

impl TranscribeBatchUseCase {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        diarizer: Option<Box<dyn SpeakerDiarizer>>,
        aligner: SpeakerAligner,
        store: Box<dyn ArtifactStore>,
        sink: Box<dyn ProgressSink>,
        executor: Box<dyn BatchExecutor>,
        config: BatchConfig,
    ) -> Result<Self, ConfigError> {
        config.plan.require(PHASE_TRANSCRIBE)?;
        config.plan.require(PHASE_ALIGN)?;
        if config.mode.requires_diarization() {
            if diarizer.is_none() {
                return Err(ConfigError::MissingDiarizer(config.mode.to_string()));
            }
            config.plan.require(PHASE_DIARIZE)?;
        }

        Ok(Self {
            recognizer,
            diarizer,
            aligner,
            store,
            sink,
            executor,
            config,
        })
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn execute(&self, sources: &[AudioSource]) -> Result<BatchReport, BatchError> {
        if let Some(diarizer) = self.active_diarizer() {
            diarizer.check_ready().map_err(BatchError::Diarizer)?;
        }

        log::info!(
            "Found {} audio files to process ({} mode)",
            sources.len(),
            self.config.mode
        );

        let mut claimed = HashSet::new();
        let mut jobs = Vec::new();
        let mut slots = Vec::with_capacity(sources.len());
        for source in sources {
            let key = ArtifactKey::new(source.stem(), self.config.mode);
            if claimed.insert(key.clone()) {
                slots.push(Some(jobs.len()));
                jobs.push(BatchJob {
                    source: source.clone(),
                    key,
                });
            } else {
                log::info!(
                    "Skipping {} - {} is already produced by another input",
                    source.display_name(),
                    key
                );
                slots.push(None);
            }
        }

        let outcomes = self.executor.execute(&jobs, &|job| self.process(job))?;

        let items = sources
            .iter()
            .zip(slots)
            .map(|(source, slot)| {
                let key = ArtifactKey::new(source.stem(), self.config.mode);
                let outcome = slot
                    .and_then(|i| outcomes.get(i).cloned())
                    .unwrap_or(ItemOutcome::Skipped);
                ItemReport {
                    source: source.display_name(),
                    key,
                    outcome,
                }
            })
            .collect();
        let report = BatchReport { items };

        self.sink.summary();
        log::info!(
            "Batch finished: {} done, {} skipped, {} failed",
            report.done(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    fn active_diarizer(&self) -> Option<&dyn SpeakerDiarizer> {
        if self.config.mode.requires_diarization() {
            self.diarizer.as_deref()
        } else {
            None
        }
    }

    fn process(&self, job: &BatchJob) -> Result<ItemOutcome, BatchError> {
        let name = job.source.display_name();

        match self.store.exists(&job.key) {
            Ok(true) => {
                log::info!("Skipping {name} - transcript already exists");
                return Ok(ItemOutcome::Skipped);
            }
            Ok(false) => {}
            Err(e) => {
                log::error!("Failed {name}: {e}");
                return Ok(ItemOutcome::Failed(e.to_string()));
            }
        }

        log::info!("Processing: {name}");
        match self.run_item(job, &name) {
            Ok(location) => {
                log::info!("Transcript for {name} saved to {location}");
                Ok(ItemOutcome::Done(location))
            }
            Err(ItemError::Diarizer(e @ DiarizerError::AuthMissing(_))) => {
                log::error!("Aborting batch at {name}: {e}");
                Err(BatchError::Diarizer(e))
            }
            Err(e) => {
                log::error!("Failed {name}: {e}");
                Ok(ItemOutcome::Failed(e.to_string()))
            }
        }
    }

    fn run_item(&self, job: &BatchJob, name: &str) -> Result<String, ItemError> {
        let tracker = ProgressTracker::new(&self.config.plan, self.sink.as_ref(), name);
        let audio = job.source.path();

        let segments = self.timed(&tracker, name, PHASE_TRANSCRIBE, || {
            Ok(self.recognizer.transcribe(audio, &|f| tracker.report(f))?)
        })?;

        let turns = match self.active_diarizer() {
            Some(diarizer) => self.timed(&tracker, name, PHASE_DIARIZE, || {
                Ok(diarizer.diarize(audio, &|f| tracker.report(f))?)
            })?,
            None => Vec::new(),
        };

        self.timed(&tracker, name, PHASE_ALIGN, || {
            let attributed = self.aligner.align(&segments, &turns)?;
            if self.config.export_text {
                let lines = TranscriptFormatter::to_lines(&attributed, self.config.mode);
                self.store.write_text(&job.key, &lines)?;
            }
            let json = TranscriptFormatter::to_json(&attributed, self.config.mode)?;
            Ok(self.store.write(&job.key, &json)?)
        })
    }

    fn timed<T>(
        &self,
        tracker: &ProgressTracker<'_>,
        name: &str,
        phase: &str,
        run: impl FnOnce() -> Result<T, ItemError>,
    ) -> Result<T, ItemError> {
        tracker.enter(phase)?;
        let started = Instant::now();
        let value = run()?;
        let elapsed = started.elapsed();
        tracker.complete_phase();
        self.sink.timing(name, phase, elapsed.as_secs_f64() * 1000.0);
        log::info!(
            "[{name}] {phase} completed in {:.1} seconds",
            elapsed.as_secs_f64()
        );
        Ok(value)
    }
}
