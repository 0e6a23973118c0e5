use std::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::batch_executor::{
    BatchError, BatchExecutor, BatchJob, ItemOutcome, ProcessFn, SequentialBatchExecutor,
};

/// Executes batch jobs on a fixed pool of scoped worker threads.
///
/// Layout: `queue → N workers → results`
///
/// Each job is taken by exactly one worker, so no two workers ever own the
/// same artifact key as long as keys within `jobs` are distinct.
pub struct ThreadedBatchExecutor {
    workers: usize,
}

impl ThreadedBatchExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl BatchExecutor for ThreadedBatchExecutor {
    fn execute(
        &self,
        jobs: &[BatchJob],
        process: &ProcessFn<'_>,
    ) -> Result<Vec<ItemOutcome>, BatchError> {
        let workers = self.workers.min(jobs.len());
        if workers <= 1 {
            return SequentialBatchExecutor.execute(jobs, process);
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &BatchJob)>();
        for pair in jobs.iter().enumerate() {
            // Receiver is alive until the scope below ends.
            let _ = job_tx.send(pair);
        }
        drop(job_tx);

        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(usize, Result<ItemOutcome, BatchError>)>();
        let cancelled = AtomicBool::new(false);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let cancelled = &cancelled;
                scope.spawn(move || {
                    for (index, job) in job_rx.iter() {
                        if cancelled.load(Ordering::Relaxed) {
                            break;
                        }
                        let result = process(job);
                        if result.is_err() {
                            cancelled.store(true, Ordering::Relaxed);
                        }
                        if result_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut outcomes: Vec<Option<ItemOutcome>> = vec![None; jobs.len()];
        for (index, result) in result_rx.try_iter() {
            outcomes[index] = Some(result?);
        }

        Ok(outcomes
            .into_iter()
            .map(|o| o.unwrap_or_else(|| ItemOutcome::Failed("not processed".to_string())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::domain::artifact_store::ArtifactKey;
    use crate::transcript::domain::audio_source::AudioSource;
    use crate::transcript::domain::mode::Mode;
    use crate::transcript::domain::speaker_diarizer::DiarizerError;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;
    use std::thread::ThreadId;

    fn jobs(n: usize) -> Vec<BatchJob> {
        (0..n)
            .map(|i| {
                let source = AudioSource::from_path(Path::new(&format!("item{i}.wav"))).unwrap();
                BatchJob {
                    key: ArtifactKey::new(source.stem(), Mode::WithSpeakers),
                    source,
                }
            })
            .collect()
    }

    #[test]
    fn test_outcomes_in_job_order() {
        let jobs = jobs(16);
        let outcomes = ThreadedBatchExecutor::new(4)
            .execute(&jobs, &|j| {
                std::thread::sleep(std::time::Duration::from_millis(1));
                Ok(ItemOutcome::Done(j.key.file_name()))
            })
            .unwrap();
        assert_eq!(outcomes.len(), 16);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(
                *outcome,
                ItemOutcome::Done(format!("item{i}_with_speakers.json"))
            );
        }
    }

    #[test]
    fn test_each_job_processed_exactly_once() {
        let jobs = jobs(32);
        let seen = Mutex::new(Vec::new());
        ThreadedBatchExecutor::new(8)
            .execute(&jobs, &|j| {
                seen.lock().unwrap().push(j.key.clone());
                Ok(ItemOutcome::Skipped)
            })
            .unwrap();
        let seen = seen.into_inner().unwrap();
        let unique: HashSet<_> = seen.iter().cloned().collect();
        assert_eq!(seen.len(), 32);
        assert_eq!(unique.len(), 32);
    }

    #[test]
    fn test_uses_multiple_threads() {
        let jobs = jobs(8);
        let threads: Mutex<HashSet<ThreadId>> = Mutex::new(HashSet::new());
        ThreadedBatchExecutor::new(4)
            .execute(&jobs, &|_| {
                threads.lock().unwrap().insert(std::thread::current().id());
                std::thread::sleep(std::time::Duration::from_millis(20));
                Ok(ItemOutcome::Skipped)
            })
            .unwrap();
        assert!(threads.lock().unwrap().len() > 1);
    }

    #[test]
    fn test_fatal_error_is_returned() {
        let jobs = jobs(6);
        let result = ThreadedBatchExecutor::new(3).execute(&jobs, &|j| {
            if j.source.stem() == "item2" {
                Err(BatchError::Diarizer(DiarizerError::AuthMissing("token".into())))
            } else {
                Ok(ItemOutcome::Skipped)
            }
        });
        assert!(matches!(result, Err(BatchError::Diarizer(_))));
    }

    #[test]
    fn test_single_worker_falls_back_to_sequential() {
        let jobs = jobs(3);
        let main_thread = std::thread::current().id();
        ThreadedBatchExecutor::new(1)
            .execute(&jobs, &|_| {
                assert_eq!(std::thread::current().id(), main_thread);
                Ok(ItemOutcome::Skipped)
            })
            .unwrap();
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        assert_eq!(ThreadedBatchExecutor::new(0).workers(), 1);
    }
}
