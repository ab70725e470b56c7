//! Frame acquisition on top of a perception session

use crate::error::Result;
use crate::render::TextureId;
use crate::session::Session;
use serde::{Deserialize, Serialize};

/// Display rotation relative to the device's natural orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayRotation {
    /// Natural orientation
    #[default]
    Rotation0,
    /// Rotated 90 degrees
    Rotation90,
    /// Rotated 180 degrees
    Rotation180,
    /// Rotated 270 degrees
    Rotation270,
}

impl DisplayRotation {
    /// Rotation in degrees
    pub fn degrees(self) -> u32 {
        match self {
            DisplayRotation::Rotation0 => 0,
            DisplayRotation::Rotation90 => 90,
            DisplayRotation::Rotation180 => 180,
            DisplayRotation::Rotation270 => 270,
        }
    }
}

/// Output surface geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    /// Display rotation
    pub rotation: DisplayRotation,
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
}

/// Adapter that yields one frame per tick from a session
///
/// Geometry changes are held until the next `next_frame()` call so the
/// session sees them before it produces a frame.
pub struct FrameSource<S: Session> {
    session: S,
    pending_geometry: Option<DisplayGeometry>,
    geometry: Option<DisplayGeometry>,
    texture: Option<TextureId>,
    frames_acquired: u64,
}

impl<S: Session> FrameSource<S> {
    /// Wrap a running session
    pub fn new(session: S) -> Self {
        Self {
            session,
            pending_geometry: None,
            geometry: None,
            texture: None,
            frames_acquired: 0,
        }
    }

    /// Record new output surface geometry
    pub fn configure(&mut self, rotation: DisplayRotation, width: u32, height: u32) {
        self.pending_geometry = Some(DisplayGeometry {
            rotation,
            width,
            height,
        });
    }

    /// Bind the texture camera images are written into
    pub fn bind_color_texture(&mut self, texture: TextureId) {
        self.session.bind_color_texture(texture);
        self.texture = Some(texture);
    }

    /// The most recently bound camera texture
    pub fn bound_texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// The geometry last forwarded to the session
    pub fn geometry(&self) -> Option<DisplayGeometry> {
        self.geometry
    }

    /// Acquire the next frame from the session
    ///
    /// Session and camera availability errors are returned as-is.
    pub fn next_frame(&mut self) -> Result<S::Frame> {
        if let Some(geometry) = self.pending_geometry.take() {
            tracing::debug!(
                rotation = geometry.rotation.degrees(),
                width = geometry.width,
                height = geometry.height,
                "applying display geometry"
            );
            self.session
                .configure_display(geometry.rotation, geometry.width, geometry.height);
            self.geometry = Some(geometry);
        }

        let frame = self.session.next_frame()?;
        self.frames_acquired += 1;
        Ok(frame)
    }

    /// Number of frames successfully acquired
    pub fn frames_acquired(&self) -> u64 {
        self.frames_acquired
    }

    /// Borrow the underlying session
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Mutably borrow the underlying session
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Unwrap the underlying session
    pub fn into_session(self) -> S {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArError;
    use crate::math::Pose;
    use crate::session::{Anchor, AnchorId};
    use crate::tracking::{Camera, Frame, HitCandidate, LightEstimate, Plane, TrackingState};
    use std::time::Duration;

    struct StillFrame(Camera);

    impl Frame for StillFrame {
        fn camera(&self) -> &Camera {
            &self.0
        }

        fn light_estimate(&self) -> LightEstimate {
            LightEstimate::default()
        }

        fn timestamp(&self) -> Duration {
            Duration::ZERO
        }

        fn hit_test(&self, _x: f32, _y: f32) -> Vec<HitCandidate> {
            Vec::new()
        }
    }

    struct NoAnchor;

    impl Anchor for NoAnchor {
        fn id(&self) -> AnchorId {
            AnchorId(0)
        }

        fn pose(&self) -> Pose {
            Pose::IDENTITY
        }

        fn tracking_state(&self) -> TrackingState {
            TrackingState::Stopped
        }

        fn detach(&mut self) {}
    }

    #[derive(Default)]
    struct StubSession {
        displays: Vec<DisplayGeometry>,
        texture: Option<TextureId>,
        fail_next: bool,
    }

    impl Session for StubSession {
        type Frame = StillFrame;
        type Anchor = NoAnchor;

        fn configure_display(&mut self, rotation: DisplayRotation, width: u32, height: u32) {
            self.displays.push(DisplayGeometry {
                rotation,
                width,
                height,
            });
        }

        fn bind_color_texture(&mut self, texture: TextureId) {
            self.texture = Some(texture);
        }

        fn next_frame(&mut self) -> Result<StillFrame> {
            if std::mem::take(&mut self.fail_next) {
                return Err(ArError::camera_unavailable("camera busy"));
            }
            Ok(StillFrame(Camera::new(
                Pose::IDENTITY,
                TrackingState::Tracking,
                1.0,
                1.0,
            )))
        }

        fn surfaces(&self) -> Vec<Plane> {
            Vec::new()
        }

        fn create_anchor(&mut self, _pose: Pose) -> Result<NoAnchor> {
            Ok(NoAnchor)
        }
    }

    #[test]
    fn failed_frame_is_not_counted() {
        let mut frames = FrameSource::new(StubSession::default());
        frames.next_frame().unwrap();

        frames.session_mut().fail_next = true;
        assert!(frames.next_frame().is_err());
        assert_eq!(frames.frames_acquired(), 1);

        frames.next_frame().unwrap();
        assert_eq!(frames.frames_acquired(), 2);
    }

    #[test]
    fn rebinding_replaces_texture() {
        let mut frames = FrameSource::new(StubSession::default());
        assert_eq!(frames.bound_texture(), None);

        frames.bind_color_texture(TextureId(3));
        frames.bind_color_texture(TextureId(4));
        assert_eq!(frames.bound_texture(), Some(TextureId(4)));
        assert_eq!(frames.session().texture, Some(TextureId(4)));
    }

    #[test]
    fn geometry_waits_for_next_frame() {
        let mut frames = FrameSource::new(StubSession::default());
        frames.configure(DisplayRotation::Rotation90, 1920, 1080);
        frames.configure(DisplayRotation::Rotation0, 1080, 1920);
        assert_eq!(frames.geometry(), None);
        assert!(frames.session().displays.is_empty());

        frames.next_frame().unwrap();
        let applied = DisplayGeometry {
            rotation: DisplayRotation::Rotation0,
            width: 1080,
            height: 1920,
        };
        assert_eq!(frames.geometry(), Some(applied));
        assert_eq!(frames.session().displays, vec![applied]);

        // Applied once only
        frames.next_frame().unwrap();
        assert_eq!(frames.session().displays.len(), 1);
    }
}
