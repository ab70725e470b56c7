//! The per-frame render loop
//!
//! `ArRenderer` is driven by the host's surface callbacks: created, changed,
//! and one `on_draw_frame` per tick. A tick never fails outward. Anything that
//! goes wrong after the clear (errors and panics alike) drops the rest of
//! that tick and the loop carries on with the next one.

use crate::anchors::AnchorManager;
use crate::config::{RenderConfig, FAR_CLIP, NEAR_CLIP, OBJECT_SCALE};
use crate::error::{ArError, Result};
use crate::frame_source::{DisplayGeometry, DisplayRotation, FrameSource};
use crate::hit_test::resolve_tap;
use crate::input::TapQueue;
use crate::render::{BackgroundRenderer, GraphicsContext, ObjectRenderer, PlaneRenderer, RenderSurface};
use crate::session::{Anchor, Session};
use crate::tracking::Frame;
use glam::{Mat4, Vec3};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// What a single tick ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session attached; only the clear happened
    NoSession,
    /// Renderers have not been set up; only the clear happened
    NotReady,
    /// The tick failed and its remaining work was skipped
    Dropped,
    /// Camera not tracking; background drawn, nothing else
    CameraOnly,
    /// Full frame drawn with this many objects
    Rendered {
        /// Object draw calls issued
        objects: usize,
    },
}

/// Running totals over all ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks started
    pub ticks: u64,
    /// Ticks with nothing to draw (no session or renderers not ready)
    pub idle: u64,
    /// Ticks abandoned after a failure
    pub dropped: u64,
    /// Ticks that drew only the camera image
    pub camera_only: u64,
    /// Ticks that drew surfaces and objects
    pub rendered: u64,
}

impl TickStats {
    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::NoSession | TickOutcome::NotReady => self.idle += 1,
            TickOutcome::Dropped => self.dropped += 1,
            TickOutcome::CameraOnly => self.camera_only += 1,
            TickOutcome::Rendered { .. } => self.rendered += 1,
        }
    }
}

/// State owned for the lifetime of one attached session
pub struct ActiveSession<S: Session> {
    frames: FrameSource<S>,
    anchors: AnchorManager<S::Anchor>,
}

impl<S: Session> ActiveSession<S> {
    /// Wrap a running session with an empty anchor set
    pub fn new(session: S) -> Self {
        Self {
            frames: FrameSource::new(session),
            anchors: AnchorManager::new(),
        }
    }

    /// The frame source for this session
    pub fn frame_source(&self) -> &FrameSource<S> {
        &self.frames
    }

    /// The live anchors
    pub fn anchors(&self) -> &AnchorManager<S::Anchor> {
        &self.anchors
    }

    /// Detach every anchor and hand back the session
    pub fn teardown(self) -> S {
        let Self { frames, mut anchors } = self;
        anchors.clear();
        frames.into_session()
    }
}

/// The three draw stages, in draw order
pub struct StageRenderers {
    /// Camera image
    pub background: Box<dyn BackgroundRenderer>,
    /// Detected surfaces
    pub planes: Box<dyn PlaneRenderer>,
    /// Anchored objects
    pub objects: Box<dyn ObjectRenderer>,
}

impl StageRenderers {
    /// Bundle the stage renderers
    pub fn new(
        background: Box<dyn BackgroundRenderer>,
        planes: Box<dyn PlaneRenderer>,
        objects: Box<dyn ObjectRenderer>,
    ) -> Self {
        Self {
            background,
            planes,
            objects,
        }
    }

    fn setup(&mut self, ctx: &GraphicsContext) -> Result<()> {
        self.background.setup(ctx)?;
        self.planes.setup(ctx)?;
        self.objects.setup(ctx)?;
        Ok(())
    }
}

/// Drives one render surface from an optional perception session
pub struct ArRenderer<S: Session> {
    surface: Box<dyn RenderSurface>,
    stages: StageRenderers,
    taps: Arc<TapQueue>,
    config: RenderConfig,
    session: Option<ActiveSession<S>>,
    geometry: Option<DisplayGeometry>,
    ready: bool,
    stats: TickStats,
    last_error: Option<String>,
}

impl<S: Session> ArRenderer<S> {
    /// Create a renderer with no session attached
    pub fn new(
        surface: Box<dyn RenderSurface>,
        stages: StageRenderers,
        taps: Arc<TapQueue>,
        config: RenderConfig,
    ) -> Self {
        Self {
            surface,
            stages,
            taps,
            config,
            session: None,
            geometry: None,
            ready: false,
            stats: TickStats::default(),
            last_error: None,
        }
    }

    /// Set up every renderer
    ///
    /// Asset failures are returned here once; until a later call succeeds,
    /// ticks only clear the surface.
    pub fn on_surface_created(&mut self, ctx: &GraphicsContext) -> Result<()> {
        self.ready = false;
        self.stages.setup(ctx)?;
        self.ready = true;
        tracing::info!(assets = %ctx.asset_root.display(), "renderers ready");

        if let Some(active) = self.session.as_mut() {
            bind_camera_texture(&mut active.frames, &*self.stages.background);
        }
        Ok(())
    }

    /// Resize the viewport and schedule the new geometry for the session
    pub fn on_surface_changed(&mut self, width: u32, height: u32, rotation: DisplayRotation) {
        self.surface.set_viewport(width, height);
        self.geometry = Some(DisplayGeometry {
            rotation,
            width,
            height,
        });
        if let Some(active) = self.session.as_mut() {
            active.frames.configure(rotation, width, height);
        }
    }

    /// Attach a running session, tearing down any previous one
    ///
    /// Returns the previously attached session.
    pub fn attach_session(&mut self, session: S) -> Option<S> {
        let previous = self.detach_session();

        let mut active = ActiveSession::new(session);
        if let Some(geometry) = self.geometry {
            active
                .frames
                .configure(geometry.rotation, geometry.width, geometry.height);
        }
        if self.ready {
            bind_camera_texture(&mut active.frames, &*self.stages.background);
        }
        self.session = Some(active);
        tracing::info!("session attached");
        previous
    }

    /// Detach every anchor and release the session
    pub fn detach_session(&mut self) -> Option<S> {
        let active = self.session.take()?;
        tracing::info!(anchors = active.anchors.len(), "session detached");
        Some(active.teardown())
    }

    /// Run one tick
    pub fn on_draw_frame(&mut self) -> TickOutcome {
        self.stats.ticks += 1;
        self.surface.clear(self.config.clear_color);

        let outcome = match self.session.as_mut() {
            None => TickOutcome::NoSession,
            Some(_) if !self.ready => TickOutcome::NotReady,
            Some(active) => {
                let taps = &*self.taps;
                let stages = &mut self.stages;
                let result = panic::catch_unwind(AssertUnwindSafe(|| run_tick(active, taps, stages)));

                match result {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(err)) => self.drop_tick(err),
                    Err(payload) => self.drop_tick(ArError::Panicked(panic_message(&*payload))),
                }
            }
        };

        self.stats.record(outcome);
        outcome
    }

    fn drop_tick(&mut self, err: ArError) -> TickOutcome {
        let tick = self.stats.ticks;
        if err.is_session_lifecycle() {
            tracing::warn!(tick, error = %err, "session unavailable, dropping frame");
        } else {
            tracing::warn!(tick, error = %err, "dropping frame");
        }
        self.last_error = Some(err.to_string());
        TickOutcome::Dropped
    }

    /// Shared handle for the input thread
    pub fn taps(&self) -> Arc<TapQueue> {
        Arc::clone(&self.taps)
    }

    /// The attached session, if any
    pub fn session(&self) -> Option<&ActiveSession<S>> {
        self.session.as_ref()
    }

    /// Whether renderer setup has succeeded
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Running tick totals
    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Message of the most recent dropped tick
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

fn bind_camera_texture<S: Session>(frames: &mut FrameSource<S>, background: &dyn BackgroundRenderer) {
    if let Some(texture) = background.texture_id() {
        frames.bind_color_texture(texture);
    }
}

fn run_tick<S: Session>(
    active: &mut ActiveSession<S>,
    taps: &TapQueue,
    stages: &mut StageRenderers,
) -> Result<TickOutcome> {
    let frame = active.frames.next_frame()?;

    if let Some(request) = resolve_tap(&frame, taps.poll()) {
        let anchor = active.frames.session_mut().create_anchor(request.pose)?;
        active.anchors.add(anchor);
    }

    let camera = frame.camera();
    stages.background.draw(camera)?;

    if !camera.tracking_state.is_tracking() {
        return Ok(TickOutcome::CameraOnly);
    }

    let projection = camera.projection_matrix(NEAR_CLIP, FAR_CLIP);
    let view = camera.view_matrix();

    let planes = active.frames.session().surfaces();
    stages
        .planes
        .draw(&planes, &camera.display_oriented_pose, &projection)?;

    let color_correction = frame.light_estimate().color_correction();
    let scale = Mat4::from_scale(Vec3::splat(OBJECT_SCALE));

    let mut objects = 0;
    for anchor in active.anchors.iter() {
        if !anchor.tracking_state().is_tracking() {
            continue;
        }
        let model = anchor.pose().to_matrix() * scale;
        stages
            .objects
            .draw(&model, &view, &projection, &color_correction)?;
        objects += 1;
    }

    tracing::trace!(objects, planes = planes.len(), "frame rendered");
    Ok(TickOutcome::Rendered { objects })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
