use anyhow::bail;
use clap::{Parser, Subcommand};
use glam::Vec3;
use melt_kernel::{
    AnimationParameters, BaseGeometry, DEFAULT_DETAIL, DEFAULT_RADIUS, DisplacementEngine,
    FrameDriver, FrameHost, FrameSink, FrameStats, FrameView, ManualClock, SimplexNoise,
    SimulatedHost,
};
use melt_render::{DebugTextRenderer, Presenter, SceneDescription};
use melt_tools::{FrameTimer, GeometryInspector, MeshSummary, TimingReport};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Upper bound on `--frames`; every frame's stats are kept for the report.
const MAX_FRAMES: u64 = 1_000_000;

/// Frames the timing window averages over.
const TIMER_WINDOW: usize = 1024;

#[derive(Parser)]
#[command(name = "melt-cli", about = "Headless melting sphere simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and startup constants
    Info,
    /// Run the frame loop against a simulated clock
    Simulate {
        /// Number of frames to produce
        #[arg(short, long, default_value = "10")]
        frames: u64,
        /// Nominal frames per second
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Relative frame interval variation, in [0, 1)
        #[arg(long, default_value = "0")]
        jitter: f32,
        /// Noise seed
        #[arg(short, long, default_value = "0")]
        seed: u32,
        /// Print a JSON report instead of per-frame text
        #[arg(long)]
        json: bool,
    },
    /// Show every step of displacing one vertex
    Probe {
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        x: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        z: f32,
        /// Elapsed time in seconds
        #[arg(short, long, default_value = "0")]
        t: f32,
        /// Noise seed
        #[arg(short, long, default_value = "0")]
        seed: u32,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

/// Echoes the debug renderer's text for each frame.
struct Transcript {
    presenter: Presenter<DebugTextRenderer>,
    echo: bool,
}

impl FrameSink for Transcript {
    fn present(&mut self, frame: &mut FrameView<'_>) {
        self.presenter.present(frame);
        match self.presenter.take_output() {
            Some(text) if self.echo => print!("{text}"),
            _ => {}
        }
    }
}

/// Simulated host that also collects frame statistics.
struct RecordingHost {
    inner: SimulatedHost,
    timer: FrameTimer,
    stats: Vec<FrameStats>,
}

impl FrameHost<ManualClock> for RecordingHost {
    fn wait_for_next_frame(&mut self, clock: &mut ManualClock) -> bool {
        self.inner.wait_for_next_frame(clock)
    }

    fn frame_done(&mut self, stats: &FrameStats) {
        self.timer.record(stats);
        self.stats.push(*stats);
    }
}

#[derive(Serialize)]
struct SimulationReport {
    seed: u32,
    frames: u64,
    stats: Vec<FrameStats>,
    summary: MeshSummary,
    timing: TimingReport,
}

/// Repeating interval pattern around `1 / fps`: short, long, nominal.
fn frame_intervals(fps: f32, jitter: f32) -> Vec<f32> {
    let dt = 1.0 / fps;
    if jitter == 0.0 {
        return vec![dt];
    }
    vec![dt * (1.0 - jitter), dt * (1.0 + jitter), dt]
}

fn timer_window(frames: u64) -> usize {
    usize::try_from(frames).map_or(TIMER_WINDOW, |f| f.min(TIMER_WINDOW))
}

fn engine(seed: u32) -> anyhow::Result<DisplacementEngine<SimplexNoise>> {
    Ok(DisplacementEngine::new(
        AnimationParameters::default(),
        SimplexNoise::new(seed),
    )?)
}

fn simulate(frames: u64, fps: f32, jitter: f32, seed: u32, json: bool) -> anyhow::Result<()> {
    if !(1..=MAX_FRAMES).contains(&frames) {
        bail!("--frames must be in 1..={MAX_FRAMES}, got {frames}");
    }
    if !(fps.is_finite() && fps > 0.0 && (1.0 / fps).is_finite()) {
        bail!("--fps must be positive with a finite frame interval, got {fps}");
    }
    if !(0.0..1.0).contains(&jitter) {
        bail!("--jitter must be in [0, 1), got {jitter}");
    }

    let base = BaseGeometry::icosphere(DEFAULT_RADIUS, DEFAULT_DETAIL)?;
    let mut driver = FrameDriver::new(engine(seed)?, base, ManualClock::new());
    let mut sink = Transcript {
        presenter: Presenter::new(SceneDescription::default(), DebugTextRenderer::new()),
        echo: !json,
    };
    let mut host = RecordingHost {
        inner: SimulatedHost::new(frames, frame_intervals(fps, jitter)),
        timer: FrameTimer::new(timer_window(frames)),
        stats: Vec::new(),
    };

    let produced = driver.run(&mut host, &mut sink)?;
    let summary = GeometryInspector::summary(driver.base(), driver.live());
    let timing = host.timer.report();

    if json {
        let report = SimulationReport {
            seed,
            frames: produced,
            stats: host.stats,
            summary,
            timing,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("---");
        println!("{summary}");
        println!("Timing: {timing}");
    }
    Ok(())
}

fn probe(point: Vec3, t: f32, seed: u32, json: bool) -> anyhow::Result<()> {
    if !point.is_finite() {
        bail!("--x, --y and --z must be finite, got {point}");
    }
    if !t.is_finite() {
        bail!("--t must be finite, got {t}");
    }
    let sample = engine(seed)?.sample(point, t);
    if json {
        println!("{}", serde_json::to_string_pretty(&sample)?);
        return Ok(());
    }
    println!("Probe ({:.3}, {:.3}, {:.3}) at t={t:.3}s", point.x, point.y, point.z);
    println!("  distance:          {:.6}", sample.distance);
    println!("  noise:             {:+.6}", sample.noise_value);
    println!("  displacement:      {:+.6}", sample.displacement);
    println!("  melt effect:       {:.6}", sample.melt_effect);
    println!("  melt contribution: {:+.6}", sample.melt_contribution);
    println!("  total:             {:+.6}", sample.total);
    println!(
        "  position:          ({:.6}, {:.6}, {:.6})",
        sample.position.x, sample.position.y, sample.position.z
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            let params = AnimationParameters::default();
            let vertices = BaseGeometry::icosphere(DEFAULT_RADIUS, DEFAULT_DETAIL)?.len();
            println!("melt-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", melt_kernel::crate_info());
            println!("render: {}", melt_render::crate_info());
            println!("tools: {}", melt_tools::crate_info());
            println!(
                "mesh: icosahedron radius={DEFAULT_RADIUS} detail={DEFAULT_DETAIL} vertices={vertices}"
            );
            println!(
                "params: amplitude={} frequency={} speed={} melt_factor={}",
                params.amplitude, params.frequency, params.speed, params.melt_factor
            );
        }
        Commands::Simulate {
            frames,
            fps,
            jitter,
            seed,
            json,
        } => simulate(frames, fps, jitter, seed, json)?,
        Commands::Probe {
            x,
            y,
            z,
            t,
            seed,
            json,
        } => probe(Vec3::new(x, y, z), t, seed, json)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_without_jitter_are_uniform() {
        assert_eq!(frame_intervals(50.0, 0.0), vec![0.02]);
    }

    #[test]
    fn jitter_averages_to_nominal() {
        let iv = frame_intervals(60.0, 0.5);
        assert_eq!(iv.len(), 3);
        let mean = iv.iter().sum::<f32>() / 3.0;
        assert!((mean - 1.0 / 60.0).abs() < 1e-6);
        assert!(iv[0] < iv[2] && iv[2] < iv[1]);
    }

    #[test]
    fn simulate_rejects_bad_arguments() {
        assert!(simulate(0, 60.0, 0.0, 0, true).is_err());
        assert!(simulate(1, 0.0, 0.0, 0, true).is_err());
        assert!(simulate(1, 60.0, 1.0, 0, true).is_err());
        assert!(simulate(1, f32::INFINITY, 0.0, 0, true).is_err());
    }

    #[test]
    fn subnormal_fps_is_rejected() {
        // 1 / 1e-39 overflows f32
        assert!(!(1.0_f32 / 1e-39).is_finite());
        assert!(simulate(2, 1e-39, 0.0, 0, true).is_err());
    }

    #[test]
    fn frame_count_has_an_upper_bound() {
        assert!(simulate(u64::MAX, 60.0, 0.0, 0, true).is_err());
        assert!(simulate(MAX_FRAMES + 1, 60.0, 0.0, 0, true).is_err());
    }

    #[test]
    fn timer_window_is_capped() {
        assert_eq!(timer_window(5), 5);
        assert_eq!(timer_window(MAX_FRAMES), TIMER_WINDOW);
        assert_eq!(timer_window(u64::MAX), TIMER_WINDOW);
    }

    #[test]
    fn sampling_rejects_non_finite_input() {
        assert!(probe(Vec3::X, f32::INFINITY, 0, true).is_err());
        assert!(probe(Vec3::new(f32::NAN, 0.0, 0.0), 0.0, 0, true).is_err());
    }

    #[test]
    fn sampling_accepts_very_late_time() {
        assert!(probe(Vec3::X, 1e20, 0, true).is_ok());
    }

    #[test]
    fn recording_host_collects_stats() {
        let base = BaseGeometry::icosphere(1.0, 1).unwrap();
        let mut driver = FrameDriver::new(engine(3).unwrap(), base, ManualClock::new());
        let mut sink = Transcript {
            presenter: Presenter::new(SceneDescription::default(), DebugTextRenderer::new()),
            echo: false,
        };
        let mut host = RecordingHost {
            inner: SimulatedHost::new(5, frame_intervals(30.0, 0.2)),
            timer: FrameTimer::new(8),
            stats: Vec::new(),
        };
        assert_eq!(driver.run(&mut host, &mut sink).unwrap(), 5);
        assert_eq!(host.stats.len(), 5);
        assert_eq!(host.timer.total_frames(), 5);
        assert_eq!(host.stats[0].elapsed, 0.0);
        assert!(host.stats.windows(2).all(|w| w[1].elapsed > w[0].elapsed));
        assert_eq!(sink.presenter.presented(), 5);
    }
}
