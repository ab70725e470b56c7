//! Run the render loop against the simulated session

use crate::config::Config;
use crate::sim::{
    DrawCounters, LoggingBackground, LoggingObjects, LoggingPlanes, LoggingSurface,
    SharedCounters, SimulatedSession,
};
use anchorcam_core::{
    ArRenderer, GraphicsContext, StageRenderers, TapEvent, TapQueue, TickStats,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// End-of-run report
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub rendered: u64,
    pub camera_only: u64,
    pub dropped: u64,
    pub anchors: usize,
    pub last_error: Option<String>,
    pub draws: DrawCounters,
}

impl RunSummary {
    fn new(stats: TickStats, anchors: usize, last_error: Option<String>, draws: DrawCounters) -> Self {
        Self {
            ticks: stats.ticks,
            rendered: stats.rendered,
            camera_only: stats.camera_only,
            dropped: stats.dropped,
            anchors,
            last_error,
            draws,
        }
    }

    fn print(&self) {
        println!("ticks:        {}", self.ticks);
        println!("  rendered:   {}", self.rendered);
        println!("  camera only: {}", self.camera_only);
        println!("  dropped:    {}", self.dropped);
        println!("live anchors: {}", self.anchors);
        println!("object draws: {}", self.draws.objects);
        if let Some(err) = &self.last_error {
            println!("last error:   {}", err);
        }
    }
}

/// Drive `config.simulation.ticks` ticks and print a summary
pub fn run(config: &Config, json: bool) -> Result<()> {
    let summary = simulate(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }
    Ok(())
}

/// Run the simulation and collect its summary
pub fn simulate(config: &Config) -> Result<RunSummary> {
    let counters = SharedCounters::default();
    let stages = StageRenderers::new(
        Box::new(LoggingBackground::new(counters.clone())),
        Box::new(LoggingPlanes(counters.clone())),
        Box::new(LoggingObjects(counters.clone())),
    );
    let mut renderer: ArRenderer<SimulatedSession> = ArRenderer::new(
        Box::new(LoggingSurface(counters.clone())),
        stages,
        Arc::new(TapQueue::new()),
        config.render.clone(),
    );

    let ctx = GraphicsContext::new(config.asset_dir.clone().unwrap_or_default());
    renderer
        .on_surface_created(&ctx)
        .context("setting up renderers")?;
    let display = &config.display;
    renderer.on_surface_changed(display.width, display.height, display.rotation);
    renderer.attach_session(SimulatedSession::new(config.simulation.clone()));

    let running = Arc::new(AtomicBool::new(true));
    let input = spawn_input(
        renderer.taps(),
        Arc::clone(&running),
        display.width,
        display.height,
        Duration::from_millis(config.simulation.tap_interval_ms),
    )?;

    let tick_interval = Duration::from_millis(config.simulation.tick_interval_ms);
    for _ in 0..config.simulation.ticks {
        renderer.on_draw_frame();
        if !tick_interval.is_zero() {
            thread::sleep(tick_interval);
        }
    }

    running.store(false, Ordering::Relaxed);
    if input.join().is_err() {
        tracing::warn!("input thread panicked");
    }

    let anchors = renderer
        .session()
        .map(|active| active.anchors().len())
        .unwrap_or_default();
    let tracked = renderer
        .session()
        .map(|active| active.frame_source().session().live_anchors())
        .unwrap_or_default();
    let stats = renderer.stats();
    let last_error = renderer.last_error().map(str::to_string);
    if let Some(session) = renderer.detach_session() {
        tracing::debug!(tracked, released = tracked - session.live_anchors(), "session released");
    }

    let draws = counters.borrow().clone();
    Ok(RunSummary::new(stats, anchors, last_error, draws))
}

/// Tap across the lower half of the screen until told to stop
fn spawn_input(
    taps: Arc<TapQueue>,
    running: Arc<AtomicBool>,
    width: u32,
    height: u32,
    interval: Duration,
) -> Result<thread::JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            let mut step = 0u32;
            while running.load(Ordering::Relaxed) {
                let column = (step % 5) as f32 / 4.0;
                let row = ((step / 5) % 3) as f32 / 2.0;
                let x = width as f32 * (0.2 + 0.6 * column);
                let y = height as f32 * (0.6 + 0.3 * row);
                taps.push(TapEvent::new(x, y));
                step += 1;
                thread::sleep(interval.max(Duration::from_millis(1)));
            }
        })
        .context("spawning input thread")?;
    Ok(handle)
}
