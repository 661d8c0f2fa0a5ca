//! Progress protocol for one report generation — a push-based sink the
//! orchestrator emits into at fixed checkpoints and during per-campaign
//! stat fetches.
//!
//! The interface accepts an `Arc<dyn ProgressSink>` and renders events
//! however it likes; `CaptureSink` records them for tests.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Instant;

/// Pipeline stages, in the fixed order they are emitted. Transitions never
/// skip backward within one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validating,
    FetchingCampaigns,
    MatchingCampaigns,
    AggregatingMetrics,
    Finalizing,
}

/// One progress emission. Counts are structured fields, never encoded in
/// the message text. Events are consumed by the caller and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    /// 0..=100, monotonically non-decreasing within one generation.
    pub percent: u8,
    pub message: String,
    pub completed_count: usize,
    pub total_count: usize,
    /// None until at least one per-campaign timing sample exists.
    pub eta_seconds: Option<f64>,
}

/// Fire-and-forget sink for progress events. `emit` must not block.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// No-op sink for callers that don't track progress.
pub struct NoOpSink;

impl ProgressSink for NoOpSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// In-memory sink that captures events for testing.
#[derive(Default)]
pub struct CaptureSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().expect("progress mutex poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().expect("progress mutex poisoned").len()
    }

    pub fn last_percent(&self) -> Option<u8> {
        self.events
            .lock()
            .expect("progress mutex poisoned")
            .last()
            .map(|e| e.percent)
    }
}

impl ProgressSink for CaptureSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().expect("progress mutex poisoned").push(event);
    }
}

/// Per-generation emitter that enforces the monotonic-percentage guarantee
/// and derives the time-remaining estimate from completed work.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    started_at: Instant,
    last_percent: u8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            started_at: Instant::now(),
            last_percent: 0,
        }
    }

    /// Emit a fixed checkpoint with no per-item counts.
    pub fn checkpoint(&mut self, stage: Stage, percent: u8, message: impl Into<String>) {
        self.emit(stage, percent, message, 0, 0);
    }

    /// Emit progress over a counted unit of work (per-campaign stat
    /// fetches). The estimate appears once the first item completes.
    pub fn emit(
        &mut self,
        stage: Stage,
        percent: u8,
        message: impl Into<String>,
        completed_count: usize,
        total_count: usize,
    ) {
        let percent = percent.min(100).max(self.last_percent);
        self.last_percent = percent;

        let eta_seconds = if completed_count >= 1 && total_count > 0 {
            let fraction = completed_count as f64 / total_count as f64;
            let elapsed = self.started_at.elapsed().as_secs_f64();
            Some(elapsed * (1.0 - fraction) / fraction)
        } else {
            None
        };

        self.sink.emit(ProgressEvent {
            stage,
            percent,
            message: message.into(),
            completed_count,
            total_count,
            eta_seconds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_never_decreases() {
        let sink = CaptureSink::new();
        let mut tracker = ProgressTracker::new(&sink);
        tracker.checkpoint(Stage::Validating, 5, "validated");
        tracker.checkpoint(Stage::FetchingCampaigns, 15, "fetching");
        // A stale lower value must be clamped up, not emitted as-is.
        tracker.checkpoint(Stage::FetchingCampaigns, 10, "late");
        let percents: Vec<u8> = sink.events().iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![5, 15, 15]);
    }

    #[test]
    fn test_eta_absent_before_first_sample() {
        let sink = CaptureSink::new();
        let mut tracker = ProgressTracker::new(&sink);
        tracker.emit(Stage::AggregatingMetrics, 20, "fetching stats", 0, 4);
        tracker.emit(Stage::AggregatingMetrics, 35, "fetching stats", 1, 4);
        let events = sink.events();
        assert!(events[0].eta_seconds.is_none());
        assert!(events[1].eta_seconds.is_some());
    }

    #[test]
    fn test_counts_are_structured_fields() {
        let sink = CaptureSink::new();
        let mut tracker = ProgressTracker::new(&sink);
        tracker.emit(Stage::AggregatingMetrics, 50, "fetching stats", 2, 4);
        let event = &sink.events()[0];
        assert_eq!(event.completed_count, 2);
        assert_eq!(event.total_count, 4);
    }

    #[test]
    fn test_percent_capped_at_100() {
        let sink = CaptureSink::new();
        let mut tracker = ProgressTracker::new(&sink);
        tracker.checkpoint(Stage::Finalizing, 120, "done");
        assert_eq!(sink.last_percent(), Some(100));
    }
}
