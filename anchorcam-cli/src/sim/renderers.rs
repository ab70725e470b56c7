//! Headless renderers that count and trace draw calls

use anchorcam_core::{
    ArError, BackgroundRenderer, Camera, GraphicsContext, ObjectRenderer, Plane, PlaneRenderer,
    Pose, RenderSurface, Result, TextureId,
};
use glam::{Mat4, Vec3};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

const CAMERA_TEXTURE: TextureId = TextureId(1);

/// Draw totals across a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrawCounters {
    pub clears: u64,
    pub background: u64,
    pub plane_passes: u64,
    pub objects: u64,
    pub viewport: Option<(u32, u32)>,
}

pub type SharedCounters = Rc<RefCell<DrawCounters>>;

/// Fail setup when the asset root is set and `asset` is missing under it
fn require_asset(ctx: &GraphicsContext, asset: &str) -> Result<()> {
    if ctx.asset_root.as_os_str().is_empty() {
        return Ok(());
    }
    let path = ctx.asset_root.join(asset);
    if path.is_file() {
        Ok(())
    } else {
        Err(ArError::asset_io(asset, format!("{} not found", path.display())))
    }
}

pub struct LoggingSurface(pub SharedCounters);

impl RenderSurface for LoggingSurface {
    fn clear(&mut self, _color: [f32; 4]) {
        self.0.borrow_mut().clears += 1;
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        tracing::debug!(width, height, "viewport");
        self.0.borrow_mut().viewport = Some((width, height));
    }
}

pub struct LoggingBackground {
    counters: SharedCounters,
    texture: Option<TextureId>,
}

impl LoggingBackground {
    pub fn new(counters: SharedCounters) -> Self {
        Self {
            counters,
            texture: None,
        }
    }
}

impl BackgroundRenderer for LoggingBackground {
    fn setup(&mut self, ctx: &GraphicsContext) -> Result<()> {
        require_asset(ctx, "shaders/screenquad.vert")?;
        self.texture = Some(CAMERA_TEXTURE);
        Ok(())
    }

    fn texture_id(&self) -> Option<TextureId> {
        self.texture
    }

    fn draw(&mut self, camera: &Camera) -> Result<()> {
        tracing::trace!(state = ?camera.tracking_state, "background");
        self.counters.borrow_mut().background += 1;
        Ok(())
    }
}

pub struct LoggingPlanes(pub SharedCounters);

impl PlaneRenderer for LoggingPlanes {
    fn setup(&mut self, ctx: &GraphicsContext) -> Result<()> {
        require_asset(ctx, "models/trigrid.png")
    }

    fn draw(&mut self, planes: &[Plane], camera_pose: &Pose, _projection: &Mat4) -> Result<()> {
        let visible = planes
            .iter()
            .filter(|p| p.tracking_state.is_tracking())
            .count();
        tracing::trace!(visible, eye = ?camera_pose.translation, "planes");
        self.0.borrow_mut().plane_passes += 1;
        Ok(())
    }
}

pub struct LoggingObjects(pub SharedCounters);

impl ObjectRenderer for LoggingObjects {
    fn setup(&mut self, ctx: &GraphicsContext) -> Result<()> {
        require_asset(ctx, "models/andy.obj")
    }

    fn draw(
        &mut self,
        model: &Mat4,
        _view: &Mat4,
        _projection: &Mat4,
        color_correction: &[f32; 4],
    ) -> Result<()> {
        let at = model.transform_point3(Vec3::ZERO);
        tracing::trace!(?at, intensity = color_correction[3], "object");
        self.0.borrow_mut().objects += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_fails_setup() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = GraphicsContext::new(dir.path());
        let err = LoggingObjects(SharedCounters::default())
            .setup(&ctx)
            .unwrap_err();
        assert!(matches!(err, ArError::AssetIo { ref asset, .. } if asset == "models/andy.obj"));
    }

    #[test]
    fn present_asset_passes_setup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        std::fs::write(dir.path().join("models/andy.obj"), "o andy\n").unwrap();
        let ctx = GraphicsContext::new(dir.path());
        assert!(LoggingObjects(SharedCounters::default()).setup(&ctx).is_ok());
    }

    #[test]
    fn empty_asset_root_skips_checks() {
        let mut background = LoggingBackground::new(SharedCounters::default());
        background.setup(&GraphicsContext::new("")).unwrap();
        assert_eq!(background.texture_id(), Some(CAMERA_TEXTURE));
    }
}
