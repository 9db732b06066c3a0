use std::time::{Duration, Instant};

use melt_common::Transform;
use serde::Serialize;

use crate::clock::{Clock, ManualClock};
use crate::displace::DisplacementEngine;
use crate::field::NoiseSource;
use crate::geometry::{BaseGeometry, LiveGeometry};

/// Rigid spin of the whole mesh about +Y, in radians per second of elapsed
/// time. Independent of the animation speed parameter.
pub const ROTATION_RATE: f32 = 0.1;

/// Lifecycle of a [`FrameDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, clock not started, no frame produced.
    Idle,
    /// Steady-state loop; every tick produces a frame.
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    #[error("frame driver has not been started")]
    NotRunning,
}

/// Everything the render collaborator needs to draw one frame.
///
/// `geometry` is handed out mutably so the consumer can clear its upload flag
/// once the positions are on the GPU.
pub struct FrameView<'a> {
    pub index: u64,
    pub elapsed: f32,
    pub delta: f32,
    pub transform: &'a Transform,
    pub base: &'a BaseGeometry,
    pub geometry: &'a mut LiveGeometry,
}

/// Render/scene collaborator invoked once per frame, after the displacement
/// pass has finished.
pub trait FrameSink {
    fn present(&mut self, frame: &mut FrameView<'_>);
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn present(&mut self, frame: &mut FrameView<'_>) {
        (**self).present(frame)
    }
}

/// Host-side "wait for the next frame" primitive for [`FrameDriver::run`].
///
/// Returns `false` once the host is torn down and no further frame should be
/// produced.
pub trait FrameHost<C: Clock> {
    fn wait_for_next_frame(&mut self, clock: &mut C) -> bool;

    /// Called with the stats of every frame [`FrameDriver::run`] produces.
    fn frame_done(&mut self, _stats: &FrameStats) {}
}

/// Per-frame statistics returned by [`FrameDriver::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStats {
    pub index: u64,
    pub elapsed: f32,
    pub delta: f32,
    pub rotation_y: f32,
    pub displace_time: Duration,
}

/// Owns the base mesh, the live mesh, the clock and the mesh transform, and
/// advances them one frame at a time.
pub struct FrameDriver<N, C> {
    engine: DisplacementEngine<N>,
    base: BaseGeometry,
    live: LiveGeometry,
    clock: C,
    transform: Transform,
    state: DriverState,
    frame_index: u64,
    last_elapsed: f32,
}

impl<N: NoiseSource, C: Clock> FrameDriver<N, C> {
    pub fn new(engine: DisplacementEngine<N>, base: BaseGeometry, clock: C) -> Self {
        let live = LiveGeometry::from_base(&base);
        Self {
            engine,
            base,
            live,
            clock,
            transform: Transform::default(),
            state: DriverState::Idle,
            frame_index: 0,
            last_elapsed: 0.0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn engine(&self) -> &DisplacementEngine<N> {
        &self.engine
    }

    pub fn base(&self) -> &BaseGeometry {
        &self.base
    }

    pub fn live(&self) -> &LiveGeometry {
        &self.live
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Frames produced so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Elapsed time used by the most recent frame.
    pub fn elapsed(&self) -> f32 {
        self.last_elapsed
    }

    /// Idle -> Running. Starts the clock; later calls are ignored.
    pub fn start(&mut self) {
        if self.state == DriverState::Running {
            tracing::warn!("frame driver already running, ignoring start");
            return;
        }
        self.clock.start();
        self.state = DriverState::Running;
        tracing::info!(vertices = self.base.len(), "frame driver running");
    }

    /// Produce one frame: read the clock, deform the mesh, spin it, and hand
    /// it to `sink`.
    pub fn tick<S: FrameSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<FrameStats, DriverError> {
        if self.state != DriverState::Running {
            return Err(DriverError::NotRunning);
        }
        let _span = tracing::trace_span!("frame", index = self.frame_index).entered();

        let raw = self.clock.elapsed();
        if raw < self.last_elapsed {
            tracing::debug!(
                raw,
                last = self.last_elapsed,
                "clock stepped backwards, holding"
            );
        }
        let t = raw.max(self.last_elapsed);
        let delta = t - self.last_elapsed;

        let displace_start = Instant::now();
        self.engine.apply(&self.base, &mut self.live, t);
        let displace_time = displace_start.elapsed();

        let rotation_y = t * ROTATION_RATE;
        self.transform.set_rotation_y(rotation_y);

        let mut frame = FrameView {
            index: self.frame_index,
            elapsed: t,
            delta,
            transform: &self.transform,
            base: &self.base,
            geometry: &mut self.live,
        };
        sink.present(&mut frame);

        let stats = FrameStats {
            index: self.frame_index,
            elapsed: t,
            delta,
            rotation_y,
            displace_time,
        };
        tracing::trace!(?stats, "frame presented");

        self.last_elapsed = t;
        self.frame_index += 1;
        Ok(stats)
    }

    /// Drive frames until `host` reports teardown. Starts the driver if it is
    /// still idle. Returns the number of frames produced by this call.
    pub fn run<H, S>(&mut self, host: &mut H, sink: &mut S) -> Result<u64, DriverError>
    where
        H: FrameHost<C> + ?Sized,
        S: FrameSink + ?Sized,
    {
        if self.state == DriverState::Idle {
            self.start();
        }
        let mut frames = 0;
        loop {
            let stats = self.tick(sink)?;
            host.frame_done(&stats);
            frames += 1;
            if !host.wait_for_next_frame(&mut self.clock) {
                break;
            }
        }
        tracing::info!(frames, elapsed = self.last_elapsed, "frame loop stopped");
        Ok(frames)
    }
}

/// Headless host: a fixed number of frames, separated by a repeating pattern
/// of intervals applied to a [`ManualClock`].
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    remaining: u64,
    intervals: Vec<f32>,
    cursor: usize,
}

impl SimulatedHost {
    /// `frames` frames in total. An empty interval list means zero-length
    /// intervals.
    pub fn new(frames: u64, intervals: Vec<f32>) -> Self {
        Self {
            remaining: frames,
            intervals,
            cursor: 0,
        }
    }

    /// Evenly paced host at `fps` frames per second.
    pub fn fixed_rate(frames: u64, fps: f32) -> Self {
        Self::new(frames, vec![1.0 / fps.max(f32::EPSILON)])
    }
}

impl FrameHost<ManualClock> for SimulatedHost {
    fn wait_for_next_frame(&mut self, clock: &mut ManualClock) -> bool {
        // The frame just produced counts against the budget
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            return false;
        }
        if let Some(dt) = self.intervals.get(self.cursor) {
            clock.advance(*dt);
            self.cursor = (self.cursor + 1) % self.intervals.len();
        }
        true
    }
}
