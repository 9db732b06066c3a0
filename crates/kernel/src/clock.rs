use std::time::Instant;

/// Source of elapsed animation time, in seconds.
pub trait Clock {
    /// Mark the animation start. Elapsed time counts from here.
    fn start(&mut self);

    /// Seconds since [`start`](Self::start).
    fn elapsed(&self) -> f32;
}

/// Wall-clock time from a monotonic [`Instant`].
#[derive(Debug, Clone, Default)]
pub struct WallClock {
    started: Option<Instant>,
}

impl WallClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for WallClock {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn elapsed(&self) -> f32 {
        self.started
            .map(|s| s.elapsed().as_secs_f32())
            .unwrap_or(0.0)
    }
}

/// Explicitly advanced clock for headless runs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: f32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(now: f32) -> Self {
        Self { now }
    }

    pub fn advance(&mut self, dt: f32) {
        self.now += dt;
    }

    pub fn set(&mut self, now: f32) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    /// Keeps the current reading; a manual clock starts wherever it was set.
    fn start(&mut self) {}

    fn elapsed(&self) -> f32 {
        self.now
    }
}
