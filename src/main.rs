//! Tiltscape - live wallpaper engine, recording frames to disk
//!
//! Stands in for the platform: synthetic device motion plays the sensors and
//! a PNG recorder plays the display surface.

use anyhow::{Context, Result};
use clap::Parser;
use image::RgbaImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

use tiltscape::cli::Args;
use tiltscape::config::ConfigSnapshot;
use tiltscape::driver::{Presenter, TickLoop};
use tiltscape::engine::Engine;
use tiltscape::error::PresentError;
use tiltscape::force::ForceSource;
use tiltscape::frame::Frame;
use tiltscape::motion::SyntheticMotion;
use tiltscape::params::RenderConfig;
use tiltscape::record::FrameRecorder;

/// Sensor sample interval of the synthetic device
const SAMPLE_INTERVAL: Duration = Duration::from_millis(20);

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.config_snapshot().context("failed to load configuration")?;
    let base = match &args.image {
        Some(path) => Some(Arc::new(
            image::open(path)
                .with_context(|| format!("failed to open image {}", path.display()))?
                .to_rgba8(),
        )),
        None => None,
    };
    let force_params = args.force_params();
    force_params
        .validate()
        .map_err(|msg| anyhow::anyhow!("invalid sensor smoothing: {msg}"))?;
    let forces = Arc::new(ForceSource::new(force_params));
    let recorder = FrameRecorder::new(args.recording_config())?;
    let motion = SyntheticMotion::new(config.seed as u32);
    let render = RenderConfig::default();

    info!(
        width = args.width,
        height = args.height,
        frames = args.frames,
        realtime = args.realtime,
        "starting"
    );

    if args.realtime {
        run_realtime(&args, config, forces, base, recorder, motion, render)
    } else {
        run_offline(&args, config, forces, base, recorder, motion, render)
    }
}

/// Deterministic stepping: one sensor sample and one tick per frame
fn run_offline(
    args: &Args,
    config: ConfigSnapshot,
    forces: Arc<ForceSource>,
    base: Option<Arc<RgbaImage>>,
    mut recorder: FrameRecorder,
    motion: SyntheticMotion,
    render: RenderConfig,
) -> Result<()> {
    let mut engine = Engine::new(config, Arc::clone(&forces), &render);
    engine.resize(args.width, args.height);
    engine.set_base_layer(base);

    let dt = render.tick_dt_s;
    for n in 0..args.frames {
        let sample = motion.sample(n as f64 * dt as f64);
        forces.on_orientation_sample(sample.orientation, dt);
        forces.on_acceleration_sample(sample.acceleration, dt);
        if let Some(frame) = engine.tick(dt) {
            recorder.record(&frame)?;
        }
    }
    info!(written = recorder.frames_written(), "done");
    Ok(())
}

/// Recorder that raises a flag once it has seen every frame
struct UntilDone {
    recorder: FrameRecorder,
    done: Arc<AtomicBool>,
}

impl Presenter for UntilDone {
    fn present(&mut self, frame: &Frame) -> Result<(), PresentError> {
        let result = self.recorder.present(frame);
        if self.recorder.is_done() {
            self.done.store(true, Ordering::Release);
        }
        result
    }
}

/// Threaded tick loop fed by a sensor thread at its own rate
fn run_realtime(
    args: &Args,
    config: ConfigSnapshot,
    forces: Arc<ForceSource>,
    base: Option<Arc<RgbaImage>>,
    recorder: FrameRecorder,
    motion: SyntheticMotion,
    render: RenderConfig,
) -> Result<()> {
    let engine = Engine::new(config, forces, &render);
    let done = Arc::new(AtomicBool::new(false));
    let presenter = UntilDone {
        recorder,
        done: Arc::clone(&done),
    };

    let tick_loop = TickLoop::spawn(engine, presenter, render)?;
    tick_loop.resize(args.width, args.height);
    tick_loop.set_base_layer(base);

    let sensors = {
        let forces = tick_loop.force_source();
        let done = Arc::clone(&done);
        thread::Builder::new()
            .name("sensors".into())
            .spawn(move || {
                let dt = SAMPLE_INTERVAL.as_secs_f32();
                let mut t = 0.0f64;
                while !done.load(Ordering::Acquire) {
                    let sample = motion.sample(t);
                    forces.on_orientation_sample(sample.orientation, dt);
                    forces.on_acceleration_sample(sample.acceleration, dt);
                    t += dt as f64;
                    thread::sleep(SAMPLE_INTERVAL);
                }
            })?
    };

    while !done.load(Ordering::Acquire) {
        thread::sleep(Duration::from_millis(10));
    }
    let stats = tick_loop.shutdown();
    if sensors.join().is_err() {
        anyhow::bail!("sensor thread panicked");
    }
    info!(
        ticks = stats.ticks,
        presented = stats.presented,
        failed = stats.failed,
        "done"
    );
    Ok(())
}
