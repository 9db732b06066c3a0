use std::collections::VecDeque;
use std::time::Duration;

use melt_kernel::FrameStats;
use serde::Serialize;

/// Rolling window of frame intervals and displacement pass costs.
#[derive(Debug)]
pub struct FrameTimer {
    /// Frame intervals in seconds.
    intervals: VecDeque<f64>,
    displace: VecDeque<Duration>,
    capacity: usize,
    total_frames: u64,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            intervals: VecDeque::with_capacity(capacity),
            displace: VecDeque::with_capacity(capacity),
            capacity,
            total_frames: 0,
        }
    }

    /// Record one frame from the driver's stats.
    pub fn record(&mut self, stats: &FrameStats) {
        let delta = if stats.delta.is_finite() {
            stats.delta.max(0.0) as f64
        } else {
            0.0
        };
        push_bounded(&mut self.intervals, delta, self.capacity);
        push_bounded(&mut self.displace, stats.displace_time, self.capacity);
        self.total_frames += 1;
    }

    /// Frames in the current window.
    pub fn count(&self) -> usize {
        self.intervals.len()
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Mean frame interval in seconds.
    pub fn average_interval(&self) -> f64 {
        if self.intervals.is_empty() {
            return 0.0;
        }
        self.intervals.iter().sum::<f64>() / self.intervals.len() as f64
    }

    pub fn average_displace(&self) -> Duration {
        if self.displace.is_empty() {
            return Duration::ZERO;
        }
        self.displace.iter().sum::<Duration>() / self.displace.len() as u32
    }

    pub fn max_displace(&self) -> Duration {
        self.displace.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    /// Frames per second over the window; zero until a nonzero interval is seen.
    pub fn fps(&self) -> f32 {
        let avg = self.average_interval();
        if avg > 0.0 { (1.0 / avg) as f32 } else { 0.0 }
    }

    pub fn report(&self) -> TimingReport {
        TimingReport {
            frames: self.total_frames,
            window: self.count(),
            fps: self.fps(),
            avg_interval_ms: self.average_interval() * 1e3,
            avg_displace_ms: self.average_displace().as_secs_f64() * 1e3,
            max_displace_ms: self.max_displace().as_secs_f64() * 1e3,
        }
    }
}

fn push_bounded<T>(buf: &mut VecDeque<T>, value: T, capacity: usize) {
    if buf.len() == capacity {
        buf.pop_front();
    }
    buf.push_back(value);
}

/// Snapshot of [`FrameTimer`] for logging or JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingReport {
    pub frames: u64,
    pub window: usize,
    pub fps: f32,
    pub avg_interval_ms: f64,
    pub avg_displace_ms: f64,
    pub max_displace_ms: f64,
}

impl std::fmt::Display for TimingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frames={} fps={:.1} interval={:.2}ms displace avg={:.3}ms max={:.3}ms",
            self.frames, self.fps, self.avg_interval_ms, self.avg_displace_ms, self.max_displace_ms
        )
    }
}
