//! Renderer collaborator contracts
//!
//! Each renderer owns its GPU resources. The core only decides when each
//! one draws and with which matrices.

use crate::error::Result;
use crate::math::Pose;
use crate::tracking::{Camera, Plane};
use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque GPU texture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Everything renderers need to create their resources
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsContext {
    /// Directory assets are loaded from
    pub asset_root: PathBuf,
}

impl GraphicsContext {
    /// Create a context rooted at `asset_root`
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }
}

/// The output surface the loop draws into
pub trait RenderSurface {
    /// Clear color and depth buffers
    fn clear(&mut self, color: [f32; 4]);

    /// Resize the viewport
    fn set_viewport(&mut self, width: u32, height: u32);
}

/// Draws the live camera image behind everything else
pub trait BackgroundRenderer {
    /// Create GPU resources; called once before the loop starts
    fn setup(&mut self, ctx: &GraphicsContext) -> Result<()>;

    /// Texture the session should write camera images into
    fn texture_id(&self) -> Option<TextureId>;

    /// Draw the camera image for this frame
    fn draw(&mut self, camera: &Camera) -> Result<()>;
}

/// Draws detected surfaces as an overlay
pub trait PlaneRenderer {
    /// Create GPU resources; called once before the loop starts
    fn setup(&mut self, ctx: &GraphicsContext) -> Result<()>;

    /// Draw every plane from the camera's point of view
    fn draw(&mut self, planes: &[Plane], camera_pose: &Pose, projection: &Mat4) -> Result<()>;
}

/// Draws one virtual object per call
pub trait ObjectRenderer {
    /// Create GPU resources; called once before the loop starts
    fn setup(&mut self, ctx: &GraphicsContext) -> Result<()>;

    /// Draw the object at `model`
    fn draw(
        &mut self,
        model: &Mat4,
        view: &Mat4,
        projection: &Mat4,
        color_correction: &[f32; 4],
    ) -> Result<()>;
}
