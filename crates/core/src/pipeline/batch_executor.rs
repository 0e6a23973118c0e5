use thiserror::Error;

use crate::output::domain::artifact_store::ArtifactKey;
use crate::shared::config_error::ConfigError;
use crate::transcript::domain::audio_source::AudioSource;
use crate::transcript::domain::speaker_diarizer::DiarizerError;

/// Terminal state of one input item.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemOutcome {
    /// Artifact already existed; no collaborator was invoked.
    Skipped,
    /// Artifact written to the given location.
    Done(String),
    /// Item failed; the batch moved on.
    Failed(String),
}

/// Errors that abort the whole batch.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("speaker diarizer not usable: {0}")]
    Diarizer(DiarizerError),
}

/// One unit of batch work: an input and the artifact it must produce.
#[derive(Clone, Debug)]
pub struct BatchJob {
    pub source: AudioSource,
    pub key: ArtifactKey,
}

pub type ProcessFn<'a> = dyn Fn(&BatchJob) -> Result<ItemOutcome, BatchError> + Sync + 'a;

/// Abstracts how batch jobs are scheduled.
///
/// Outcomes are returned in job order. A `BatchError` from any job stops
/// scheduling further jobs and is returned.
pub trait BatchExecutor: Send + Sync {
    fn execute(
        &self,
        jobs: &[BatchJob],
        process: &ProcessFn<'_>,
    ) -> Result<Vec<ItemOutcome>, BatchError>;
}

/// Runs jobs one at a time in order.
pub struct SequentialBatchExecutor;

impl BatchExecutor for SequentialBatchExecutor {
    fn execute(
        &self,
        jobs: &[BatchJob],
        process: &ProcessFn<'_>,
    ) -> Result<Vec<ItemOutcome>, BatchError> {
        jobs.iter().map(process).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::domain::mode::Mode;
    use std::path::Path;
    use std::sync::Mutex;

    fn job(name: &str) -> BatchJob {
        let source = AudioSource::from_path(Path::new(&format!("{name}.wav"))).unwrap();
        BatchJob {
            key: ArtifactKey::new(source.stem(), Mode::Simple),
            source,
        }
    }

    #[test]
    fn test_sequential_preserves_order() {
        let jobs = vec![job("a"), job("b"), job("c")];
        let seen = Mutex::new(Vec::new());
        let outcomes = SequentialBatchExecutor
            .execute(&jobs, &|j| {
                seen.lock().unwrap().push(j.source.stem().to_string());
                Ok(ItemOutcome::Done(j.key.file_name()))
            })
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(outcomes[2], ItemOutcome::Done("c_simple.json".to_string()));
    }

    #[test]
    fn test_sequential_stops_on_fatal_error() {
        let jobs = vec![job("a"), job("b"), job("c")];
        let calls = Mutex::new(0);
        let result = SequentialBatchExecutor.execute(&jobs, &|j| {
            *calls.lock().unwrap() += 1;
            if j.source.stem() == "b" {
                Err(BatchError::Diarizer(DiarizerError::AuthMissing("token".into())))
            } else {
                Ok(ItemOutcome::Skipped)
            }
        });
        assert!(matches!(result, Err(BatchError::Diarizer(_))));
        assert_eq!(*calls.lock().unwrap(), 2);
    }
}
