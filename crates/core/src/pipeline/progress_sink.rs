use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Passive receiver of batch progress.
///
/// Called synchronously from the item being processed, possibly from several
/// worker threads at once; implementations must return quickly and must not
/// fail. Every event names its item so concurrent items stay attributable.
pub trait ProgressSink: Send + Sync {
    /// Global completion of `item` in `[0, 1]`, currently inside `phase`.
    fn progress(&self, item: &str, phase: &str, fraction: f64);

    /// How long `phase` took for `item`. Default: ignored.
    fn timing(&self, _item: &str, _phase: &str, _duration_ms: f64) {}

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn progress(&self, _item: &str, _phase: &str, _fraction: f64) {}
}

/// Logs progress through the `log` facade and keeps per-phase timing for a
/// summary report.
///
/// Progress lines are throttled: one per `step` of global completion per item,
/// plus the final 100%.
pub struct LogProgressSink {
    step: f64,
    last_logged: Mutex<HashMap<String, f64>>,
    timings: Mutex<HashMap<String, Vec<f64>>>,
    start_time: Instant,
}

impl LogProgressSink {
    pub fn new(step: f64) -> Self {
        Self {
            step: step.clamp(0.01, 1.0),
            last_logged: Mutex::new(HashMap::new()),
            timings: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was timed.
    pub fn summary_string(&self) -> Option<String> {
        let timings = self.timings.lock().unwrap_or_else(|e| e.into_inner());
        if timings.is_empty() {
            return None;
        }

        let items = self
            .last_logged
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len();
        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Batch summary ({items} items, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut phases: Vec<_> = timings.keys().collect();
        phases.sort();
        for phase in phases {
            let durations = &timings[phase];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {phase:12}: avg {avg_ms:8.1}ms  total {total_ms:9.0}ms  ({pct:4.1}%)"
            ));
        }

        Some(lines.join("\n"))
    }

    /// Returns the recorded durations for a given phase.
    pub fn timings_for(&self, phase: &str) -> Option<Vec<f64>> {
        self.timings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(phase)
            .cloned()
    }

    /// Records `fraction` as logged for `item` if it crosses the throttle.
    fn should_log(&self, item: &str, fraction: f64) -> bool {
        let mut last = self.last_logged.lock().unwrap_or_else(|e| e.into_inner());
        let previous = last.get(item).copied();
        let due = match previous {
            None => true,
            Some(prev) => fraction - prev >= self.step || (fraction >= 1.0 && prev < 1.0),
        };
        if due {
            last.insert(item.to_string(), fraction);
        }
        due
    }
}

impl Default for LogProgressSink {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl ProgressSink for LogProgressSink {
    fn progress(&self, item: &str, phase: &str, fraction: f64) {
        if self.should_log(item, fraction) {
            let pct = fraction * 100.0;
            log::info!("[{item}] {phase}: {pct:.1}%");
        }
    }

    fn timing(&self, item: &str, phase: &str, duration_ms: f64) {
        log::debug!("[{item}] {phase} took {duration_ms:.0}ms");
        self.timings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(phase.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
