use std::cell::Cell;

use serde::{Deserialize, Serialize};

use super::progress_sink::ProgressSink;
use crate::shared::config_error::ConfigError;
use crate::shared::constants::WEIGHT_SUM_TOLERANCE;

/// A named stage of a per-item run and its share of overall progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub weight: f64,
}

impl Phase {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Ordered phases whose weights sum to one.
///
/// Maps a phase's local completion to global completion:
/// `global = sum(weights of earlier phases) + weight * local`.
#[derive(Clone, Debug)]
pub struct PhasePlan {
    phases: Vec<Phase>,
    offsets: Vec<f64>,
}

impl PhasePlan {
    pub fn new(phases: Vec<Phase>) -> Result<Self, ConfigError> {
        for (i, phase) in phases.iter().enumerate() {
            if !(phase.weight > 0.0 && phase.weight <= 1.0) {
                return Err(ConfigError::WeightOutOfRange {
                    name: phase.name.clone(),
                    weight: phase.weight,
                });
            }
            if phases[..i].iter().any(|p| p.name == phase.name) {
                return Err(ConfigError::DuplicatePhase(phase.name.clone()));
            }
        }

        let sum: f64 = phases.iter().map(|p| p.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }

        let offsets = phases
            .iter()
            .scan(0.0, |acc, p| {
                let offset = *acc;
                *acc += p.weight;
                Some(offset)
            })
            .collect();

        Ok(Self { phases, offsets })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }

    pub fn require(&self, name: &str) -> Result<usize, ConfigError> {
        self.index_of(name)
            .ok_or_else(|| ConfigError::MissingPhase(name.to_string()))
    }

    /// Global completion after phase `index` reached `local` (clamped to `[0, 1]`).
    pub fn global(&self, index: usize, local: f64) -> f64 {
        let Some(phase) = self.phases.get(index) else {
            return 1.0;
        };
        let local = if local.is_nan() {
            0.0
        } else {
            local.clamp(0.0, 1.0)
        };
        (self.offsets[index] + phase.weight * local).min(1.0)
    }
}

/// Per-item progress cursor over a [`PhasePlan`].
///
/// Forwards global completion to a sink, never letting it decrease.
pub struct ProgressTracker<'a> {
    plan: &'a PhasePlan,
    sink: &'a dyn ProgressSink,
    item: &'a str,
    phase: Cell<usize>,
    last: Cell<f64>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(plan: &'a PhasePlan, sink: &'a dyn ProgressSink, item: &'a str) -> Self {
        Self {
            plan,
            sink,
            item,
            phase: Cell::new(0),
            last: Cell::new(0.0),
        }
    }

    /// Moves the cursor to the named phase and reports its start.
    pub fn enter(&self, name: &str) -> Result<(), ConfigError> {
        self.phase.set(self.plan.require(name)?);
        self.report(0.0);
        Ok(())
    }

    pub fn report(&self, local: f64) {
        let index = self.phase.get();
        let value = self.plan.global(index, local).max(self.last.get());
        self.last.set(value);
        let phase = self
            .plan
            .phases()
            .get(index)
            .map_or("", |p| p.name.as_str());
        self.sink.progress(self.item, phase, value);
    }

    pub fn complete_phase(&self) {
        self.report(1.0);
    }

    pub fn current(&self) -> f64 {
        self.last.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::sync::Mutex;

    fn plan3() -> PhasePlan {
        PhasePlan::new(vec![
            Phase::new("transcribe", 0.5),
            Phase::new("diarize", 0.35),
            Phase::new("align", 0.15),
        ])
        .unwrap()
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(String, String, f64)>>,
    }

    impl ProgressSink for RecordingSink {
        fn progress(&self, item: &str, phase: &str, fraction: f64) {
            self.events
                .lock()
                .unwrap()
                .push((item.to_string(), phase.to_string(), fraction));
        }
    }

    #[rstest]
    #[case::start_of_first(0, 0.0, 0.0)]
    #[case::middle_of_first(0, 0.5, 0.25)]
    #[case::end_of_first(0, 1.0, 0.5)]
    #[case::middle_of_second(1, 0.5, 0.675)]
    #[case::middle_of_last(2, 0.5, 0.925)]
    #[case::end_of_last(2, 1.0, 1.0)]
    #[case::clamped_high(1, 3.0, 0.85)]
    #[case::clamped_low(1, -1.0, 0.5)]
    #[case::past_last_phase(7, 0.0, 1.0)]
    fn test_global_fraction(#[case] index: usize, #[case] local: f64, #[case] expected: f64) {
        assert_relative_eq!(plan3().global(index, local), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_nan_local_counts_as_zero() {
        assert_relative_eq!(plan3().global(1, f64::NAN), 0.5);
    }

    #[rstest]
    #[case::under(vec![Phase::new("a", 0.5), Phase::new("b", 0.4)])]
    #[case::over(vec![Phase::new("a", 0.7), Phase::new("b", 0.4)])]
    #[case::empty(vec![])]
    fn test_weights_must_sum_to_one(#[case] phases: Vec<Phase>) {
        assert!(matches!(
            PhasePlan::new(phases),
            Err(ConfigError::WeightSum { .. })
        ));
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.5)]
    #[case::above_one(1.5)]
    #[case::nan(f64::NAN)]
    fn test_weight_out_of_range(#[case] weight: f64) {
        let result = PhasePlan::new(vec![Phase::new("a", weight), Phase::new("b", 1.0)]);
        assert!(matches!(result, Err(ConfigError::WeightOutOfRange { .. })));
    }

    #[test]
    fn test_floating_point_drift_tolerated() {
        let plan = PhasePlan::new(vec![
            Phase::new("a", 0.1),
            Phase::new("b", 0.2),
            Phase::new("c", 0.7),
        ]);
        assert!(plan.is_ok());
    }

    #[test]
    fn test_duplicate_phase_rejected() {
        let result = PhasePlan::new(vec![Phase::new("a", 0.5), Phase::new("a", 0.5)]);
        assert!(matches!(result, Err(ConfigError::DuplicatePhase(name)) if name == "a"));
    }

    #[test]
    fn test_require_missing_phase() {
        assert!(matches!(
            plan3().require("upload"),
            Err(ConfigError::MissingPhase(_))
        ));
        assert_eq!(plan3().require("align").unwrap(), 2);
    }

    #[test]
    fn test_tracker_reports_item_and_phase() {
        let plan = plan3();
        let sink = RecordingSink::default();
        let tracker = ProgressTracker::new(&plan, &sink, "talk.wav");
        tracker.enter("diarize").unwrap();
        tracker.report(0.5);

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].0, "talk.wav");
        assert_eq!(events[1].1, "diarize");
        assert_relative_eq!(events[1].2, 0.675, epsilon = 1e-9);
    }

    #[test]
    fn test_tracker_is_non_decreasing() {
        let plan = plan3();
        let sink = RecordingSink::default();
        let tracker = ProgressTracker::new(&plan, &sink, "a");
        tracker.enter("transcribe").unwrap();
        tracker.report(0.8);
        tracker.report(0.2);
        tracker.complete_phase();
        tracker.enter("align").unwrap();
        tracker.enter("diarize").unwrap();
        tracker.report(0.1);

        let events = sink.events.lock().unwrap();
        let values: Vec<f64> = events.iter().map(|e| e.2).collect();
        assert!(values.windows(2).all(|w| w[1] >= w[0]), "{values:?}");
        assert_relative_eq!(tracker.current(), 0.85, epsilon = 1e-9);
    }

    #[test]
    fn test_tracker_reaches_one() {
        let plan = plan3();
        let sink = RecordingSink::default();
        let tracker = ProgressTracker::new(&plan, &sink, "a");
        for name in ["transcribe", "diarize", "align"] {
            tracker.enter(name).unwrap();
            tracker.complete_phase();
        }
        assert_relative_eq!(tracker.current(), 1.0, epsilon = 1e-9);
    }
}
