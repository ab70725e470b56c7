//! Contracts the core requires from the perception session

use crate::error::Result;
use crate::frame_source::DisplayRotation;
use crate::math::Pose;
use crate::render::TextureId;
use crate::tracking::{Frame, Plane, TrackingState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an anchor within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub u64);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// A durable spatial reference tracked by the perception session
///
/// The session keeps refining the pose after creation, so `pose()` and
/// `tracking_state()` may change between ticks.
pub trait Anchor {
    /// Anchor identity
    fn id(&self) -> AnchorId;

    /// Current world pose
    fn pose(&self) -> Pose;

    /// Current tracking state
    fn tracking_state(&self) -> TrackingState;

    /// Release the tracking resources held for this anchor
    ///
    /// Must be safe to call more than once and on untracked anchors.
    fn detach(&mut self);
}

/// The perception session backing a [`FrameSource`](crate::FrameSource)
///
/// Starting and stopping the session happens outside the core; an attached
/// session is expected to be running.
pub trait Session {
    /// Per-tick snapshot type
    type Frame: Frame;
    /// Anchor handle type
    type Anchor: Anchor;

    /// Inform the session of the output surface geometry
    fn configure_display(&mut self, rotation: DisplayRotation, width: u32, height: u32);

    /// Texture the session writes camera images into
    fn bind_color_texture(&mut self, texture: TextureId);

    /// Acquire the next frame
    ///
    /// Blocks until a new camera image is available or returns the latest
    /// cached frame.
    fn next_frame(&mut self) -> Result<Self::Frame>;

    /// Every surface the session currently knows about
    fn surfaces(&self) -> Vec<Plane>;

    /// Start tracking a new anchor at `pose`
    fn create_anchor(&mut self, pose: Pose) -> Result<Self::Anchor>;
}
