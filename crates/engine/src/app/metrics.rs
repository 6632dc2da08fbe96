use std::time::{Duration, Instant};

/// Periodic frame statistics logged by the loop. The loop runs one
/// simulation tick per frame, so frame rate and tick rate are the same
/// number; the interesting split is work time against idle wait.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub work_ms: f32,
    pub idle_ms: f32,
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    work_sum: Duration,
    idle_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval_start: Instant::now(),
            interval,
            frames: 0,
            work_sum: Duration::ZERO,
            idle_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, work: Duration, idle: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.work_sum = self.work_sum.saturating_add(work);
        self.idle_sum = self.idle_sum.saturating_add(idle);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let per_frame_ms = |sum: Duration, frames: u32| {
            if frames == 0 {
                0.0
            } else {
                (sum.as_secs_f32() / frames as f32) * 1000.0
            }
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            work_ms: per_frame_ms(self.work_sum, self.frames),
            idle_ms: per_frame_ms(self.idle_sum, self.frames),
        };

        self.interval_start = now;
        self.frames = 0;
        self.work_sum = Duration::ZERO;
        self.idle_sum = Duration::ZERO;

        Some(snapshot)
    }
}
