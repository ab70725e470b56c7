//! Anchorcam core - per-frame anchoring and render sequencing for camera AR
//!
//! This crate owns the control loop that sits between a perception session
//! (camera tracking, plane detection) and a set of renderers. Each tick it
//! pulls a frame, turns at most one pending tap into a spatial anchor, keeps
//! the anchor set bounded, and drives the background, surface and object
//! draw stages according to the current tracking state.

#![warn(missing_docs)]

pub mod anchors;
pub mod config;
pub mod error;
pub mod frame_source;
pub mod input;
pub mod math;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod tracking;

pub use anchors::{AnchorManager, MAX_ANCHORS};
pub use config::{RenderConfig, FAR_CLIP, NEAR_CLIP, OBJECT_SCALE};
pub use error::{ArError, Result};
pub use frame_source::{DisplayGeometry, DisplayRotation, FrameSource};
pub use hit_test::{resolve_tap, AnchorRequest};
pub use input::{TapEvent, TapQueue};
pub use math::Pose;
pub use pipeline::{ActiveSession, ArRenderer, StageRenderers, TickOutcome, TickStats};
pub use render::{
    BackgroundRenderer, GraphicsContext, ObjectRenderer, PlaneRenderer, RenderSurface, TextureId,
};
pub use session::{Anchor, AnchorId, Session};
pub use tracking::{
    Camera, Frame, HitCandidate, HitTrackable, LightEstimate, OrientationMode, Plane,
    TrackableKind, TrackingState,
};
