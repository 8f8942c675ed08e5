//! Background tick loop.
//!
//! One thread owns the [`Engine`] and a [`Presenter`]. Configuration,
//! resize, base-layer and visibility changes arrive as [`EngineCommand`]s
//! and are applied only between ticks. Sensor producers write straight into
//! the shared [`ForceSource`] without going through the channel.

use image::RgbaImage;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::ConfigSnapshot;
use crate::engine::Engine;
use crate::error::PresentError;
use crate::force::ForceSource;
use crate::frame::Frame;
use crate::params::RenderConfig;

/// The platform surface a frame is handed to
pub trait Presenter: Send {
    /// Show one frame. [`PresentError::NotReady`] skips the tick silently.
    fn present(&mut self, frame: &Frame) -> Result<(), PresentError>;
}

/// Requests from the collaborator layer, applied at the next tick boundary
#[derive(Debug)]
pub enum EngineCommand {
    Configure(ConfigSnapshot),
    Resize { width: u32, height: u32 },
    SetBaseLayer(Option<Arc<RgbaImage>>),
    /// Surface shown (`true`) or hidden (`false`)
    Visibility(bool),
    Shutdown,
}

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub ticks: u64,
    pub presented: u64,
    /// Surface not ready
    pub skipped: u64,
    pub failed: u64,
}

/// Handle to a running tick loop. Dropping it shuts the loop down.
pub struct TickLoop {
    commands: Sender<EngineCommand>,
    forces: Arc<ForceSource>,
    thread: Option<thread::JoinHandle<TickStats>>,
}

impl TickLoop {
    /// Start ticking `engine` on a new thread, presenting into `presenter`
    pub fn spawn<P>(engine: Engine, presenter: P, render: RenderConfig) -> std::io::Result<Self>
    where
        P: Presenter + 'static,
    {
        let (commands, rx) = mpsc::channel();
        let forces = Arc::clone(engine.forces());
        let thread = thread::Builder::new()
            .name("tick-loop".into())
            .spawn(move || run(engine, presenter, rx, render))?;
        Ok(Self {
            commands,
            forces,
            thread: Some(thread),
        })
    }

    /// Shared sensor sink for producer threads
    pub fn force_source(&self) -> Arc<ForceSource> {
        Arc::clone(&self.forces)
    }

    pub fn configure(&self, config: ConfigSnapshot) {
        self.send(EngineCommand::Configure(config));
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.send(EngineCommand::Resize { width, height });
    }

    pub fn set_base_layer(&self, image: Option<Arc<RgbaImage>>) {
        self.send(EngineCommand::SetBaseLayer(image));
    }

    pub fn set_visible(&self, visible: bool) {
        self.send(EngineCommand::Visibility(visible));
    }

    fn send(&self, command: EngineCommand) {
        if self.commands.send(command).is_err() {
            warn!("tick loop has exited, command dropped");
        }
    }

    /// Stop the loop after the current tick and wait for it
    pub fn shutdown(mut self) -> TickStats {
        self.stop()
    }

    fn stop(&mut self) -> TickStats {
        let _ = self.commands.send(EngineCommand::Shutdown);
        match self.thread.take().map(|t| t.join()) {
            Some(Ok(stats)) => stats,
            Some(Err(_)) => {
                warn!("tick loop thread panicked");
                TickStats::default()
            }
            None => TickStats::default(),
        }
    }
}

impl Drop for TickLoop {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop();
        }
    }
}

/// What the loop should do after handling a command
enum Flow {
    Continue,
    Stop,
}

struct LoopState {
    engine: Engine,
    visible: bool,
}

impl LoopState {
    fn handle(&mut self, command: EngineCommand) -> Flow {
        match command {
            EngineCommand::Configure(config) => {
                self.engine.apply_config(config);
            }
            EngineCommand::Resize { width, height } => self.engine.resize(width, height),
            EngineCommand::SetBaseLayer(image) => self.engine.set_base_layer(image),
            EngineCommand::Visibility(visible) => {
                if visible && !self.visible {
                    info!("surface visible, reseeding");
                    self.engine.forces().reset();
                    self.engine.reseed();
                } else if !visible && self.visible {
                    info!("surface hidden, pausing");
                }
                self.visible = visible;
            }
            EngineCommand::Shutdown => return Flow::Stop,
        }
        Flow::Continue
    }
}

fn run<P: Presenter>(
    engine: Engine,
    mut presenter: P,
    rx: Receiver<EngineCommand>,
    render: RenderConfig,
) -> TickStats {
    info!(interval_ms = render.tick_interval.as_millis() as u64, "tick loop started");
    let mut state = LoopState {
        engine,
        visible: true,
    };
    let mut stats = TickStats::default();
    let mut window_start = Instant::now();
    let mut window_ticks = 0u32;
    let mut window_busy = Duration::ZERO;

    'ticks: loop {
        // Hidden: nothing to do until the next command
        if !state.visible {
            match rx.recv() {
                Ok(command) => {
                    if let Flow::Stop = state.handle(command) {
                        break 'ticks;
                    }
                }
                Err(_) => break 'ticks,
            }
        }
        loop {
            match rx.try_recv() {
                Ok(command) => {
                    if let Flow::Stop = state.handle(command) {
                        break 'ticks;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'ticks,
            }
        }
        if !state.visible {
            continue;
        }

        let started = Instant::now();
        if let Some(frame) = state.engine.tick(render.tick_dt_s) {
            stats.ticks += 1;
            match presenter.present(&frame) {
                Ok(()) => stats.presented += 1,
                Err(PresentError::NotReady) => stats.skipped += 1,
                Err(e) => {
                    stats.failed += 1;
                    warn!(error = %e, "present failed");
                }
            }
        }
        window_busy += started.elapsed();
        window_ticks += 1;

        if window_start.elapsed() >= render.stats_interval {
            let avg_ms = window_busy.as_secs_f64() * 1000.0 / window_ticks.max(1) as f64;
            debug!(ticks = window_ticks, avg_tick_ms = avg_ms, "frame stats");
            window_start = Instant::now();
            window_ticks = 0;
            window_busy = Duration::ZERO;
        }

        // Fixed delay after each tick; a long tick pushes the next one back
        thread::sleep(render.tick_interval);
    }

    info!(
        ticks = stats.ticks,
        presented = stats.presented,
        skipped = stats.skipped,
        "tick loop stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Clone, Default)]
    struct Counting {
        frames: Arc<AtomicU64>,
        not_ready: bool,
    }

    impl Presenter for Counting {
        fn present(&mut self, _frame: &Frame) -> Result<(), PresentError> {
            self.frames.fetch_add(1, Ordering::SeqCst);
            if self.not_ready {
                Err(PresentError::NotReady)
            } else {
                Ok(())
            }
        }
    }

    fn fast() -> RenderConfig {
        RenderConfig {
            tick_interval: Duration::from_millis(1),
            ..RenderConfig::default()
        }
    }

    fn engine() -> Engine {
        let config = ConfigSnapshot {
            particles_enabled: true,
            particle_count: 20,
            ..ConfigSnapshot::default()
        };
        let mut engine = Engine::new(config, Arc::new(ForceSource::default()), &fast());
        engine.resize(64, 64);
        engine
    }

    fn wait_for(frames: &AtomicU64, at_least: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while frames.load(Ordering::SeqCst) < at_least && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_loop_presents_until_shutdown() {
        let presenter = Counting::default();
        let frames = Arc::clone(&presenter.frames);
        let tick_loop = TickLoop::spawn(engine(), presenter, fast()).unwrap();
        wait_for(&frames, 5);
        let stats = tick_loop.shutdown();
        assert!(stats.presented >= 5);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_not_ready_is_skipped_not_fatal() {
        let presenter = Counting {
            not_ready: true,
            ..Counting::default()
        };
        let frames = Arc::clone(&presenter.frames);
        let tick_loop = TickLoop::spawn(engine(), presenter, fast()).unwrap();
        wait_for(&frames, 10);
        let stats = tick_loop.shutdown();
        assert!(stats.skipped >= 10);
        assert_eq!(stats.presented, 0);
    }

    #[test]
    fn test_hidden_loop_stops_ticking() {
        let presenter = Counting::default();
        let frames = Arc::clone(&presenter.frames);
        let tick_loop = TickLoop::spawn(engine(), presenter, fast()).unwrap();
        wait_for(&frames, 3);

        tick_loop.set_visible(false);
        thread::sleep(Duration::from_millis(30));
        let paused_at = frames.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(frames.load(Ordering::SeqCst), paused_at);

        tick_loop.set_visible(true);
        wait_for(&frames, paused_at + 3);
        assert!(frames.load(Ordering::SeqCst) >= paused_at + 3);
        tick_loop.shutdown();
    }

    #[test]
    fn test_zero_size_surface_never_presents() {
        let presenter = Counting::default();
        let frames = Arc::clone(&presenter.frames);
        let tick_loop = TickLoop::spawn(engine(), presenter, fast()).unwrap();
        tick_loop.resize(0, 0);
        thread::sleep(Duration::from_millis(20));
        let before = frames.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(frames.load(Ordering::SeqCst), before);
        tick_loop.shutdown();
    }

    #[test]
    fn test_drop_shuts_down() {
        let presenter = Counting::default();
        let frames = Arc::clone(&presenter.frames);
        {
            let tick_loop = TickLoop::spawn(engine(), presenter, fast()).unwrap();
            tick_loop.configure(ConfigSnapshot::default());
            wait_for(&frames, 1);
        }
        let after_drop = frames.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(frames.load(Ordering::SeqCst), after_drop);
    }
}
