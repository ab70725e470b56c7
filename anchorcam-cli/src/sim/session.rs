//! A deterministic perception session for headless runs
//!
//! The scene is a 4m x 4m floor at y = 0 plus a ring of feature points
//! hovering above it. The camera hovers at eye height looking down at the
//! floor and slowly pans.

use crate::config::SimulationConfig;
use anchorcam_core::{
    Anchor, AnchorId, ArError, Camera, DisplayGeometry, DisplayRotation, Frame, HitCandidate,
    HitTrackable, LightEstimate, OrientationMode, Plane, Pose, Result, Session, TextureId,
    TrackingState,
};
use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const CAMERA_HEIGHT: f32 = 1.4;
const CAMERA_PITCH: f32 = -0.6;
const FOV_Y: f32 = 1.05;
const FEATURE_RADIUS: f32 = 0.05;

struct FeaturePoint {
    position: Vec3,
    orientation: OrientationMode,
}

#[derive(Debug)]
struct AnchorState {
    pose: Pose,
    tracking_state: TrackingState,
    detached: bool,
}

/// Anchor handle backed by the simulated session
pub struct SimAnchor {
    id: AnchorId,
    state: Rc<RefCell<AnchorState>>,
}

impl Anchor for SimAnchor {
    fn id(&self) -> AnchorId {
        self.id
    }

    fn pose(&self) -> Pose {
        self.state.borrow().pose
    }

    fn tracking_state(&self) -> TrackingState {
        self.state.borrow().tracking_state
    }

    fn detach(&mut self) {
        let mut state = self.state.borrow_mut();
        state.detached = true;
        state.tracking_state = TrackingState::Stopped;
    }
}

/// One simulated frame
pub struct SimFrame {
    camera: Camera,
    light: LightEstimate,
    timestamp: Duration,
    geometry: DisplayGeometry,
    floor: Plane,
    features: Rc<Vec<FeaturePoint>>,
}

impl SimFrame {
    /// World-space ray through a screen point
    fn screen_ray(&self, x: f32, y: f32) -> (Vec3, Vec3) {
        let width = self.geometry.width.max(1) as f32;
        let height = self.geometry.height.max(1) as f32;
        let ndc_x = 2.0 * x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height;

        let half_height = (self.camera.fov_y * 0.5).tan();
        let local = Vec3::new(
            ndc_x * half_height * self.camera.aspect_ratio,
            ndc_y * half_height,
            -1.0,
        );
        let pose = &self.camera.display_oriented_pose;
        (pose.translation, (pose.rotation * local).normalize())
    }
}

impl Frame for SimFrame {
    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn light_estimate(&self) -> LightEstimate {
        self.light
    }

    fn timestamp(&self) -> Duration {
        self.timestamp
    }

    fn hit_test(&self, x: f32, y: f32) -> Vec<HitCandidate> {
        let (origin, dir) = self.screen_ray(x, y);
        let mut hits = Vec::new();

        // Infinite floor; polygon containment is left to the resolver
        if dir.y.abs() > f32::EPSILON {
            let t = (self.floor.center_pose.translation.y - origin.y) / dir.y;
            if t > 0.0 {
                hits.push(HitCandidate {
                    trackable: HitTrackable::Plane(self.floor.clone()),
                    pose: Pose::new(origin + dir * t, self.floor.center_pose.rotation),
                    distance: t,
                });
            }
        }

        for feature in self.features.iter() {
            let to_center = feature.position - origin;
            let along = to_center.dot(dir);
            if along <= 0.0 {
                continue;
            }
            let miss = (to_center - dir * along).length();
            if miss <= FEATURE_RADIUS {
                hits.push(HitCandidate {
                    trackable: HitTrackable::Point {
                        orientation: feature.orientation,
                    },
                    pose: Pose::from_translation(feature.position),
                    distance: along,
                });
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Simulated perception session
pub struct SimulatedSession {
    settings: SimulationConfig,
    geometry: DisplayGeometry,
    texture: Option<TextureId>,
    frame_index: u64,
    floor: Plane,
    features: Rc<Vec<FeaturePoint>>,
    anchors: Vec<(AnchorId, Rc<RefCell<AnchorState>>)>,
    next_anchor: u64,
}

impl SimulatedSession {
    pub fn new(settings: SimulationConfig) -> Self {
        let features = (0..8)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / 8.0;
                FeaturePoint {
                    position: Vec3::new(angle.cos() * 0.8, 0.6, -1.6 + angle.sin() * 0.4),
                    orientation: if i % 2 == 0 {
                        OrientationMode::EstimatedSurfaceNormal
                    } else {
                        OrientationMode::Initialized
                    },
                }
            })
            .collect();

        Self {
            settings,
            geometry: DisplayGeometry {
                rotation: DisplayRotation::Rotation0,
                width: 1,
                height: 1,
            },
            texture: None,
            frame_index: 0,
            floor: Plane::rectangle(1, Pose::from_translation(Vec3::new(0.0, 0.0, -1.5)), 2.0, 2.0),
            features: Rc::new(features),
            anchors: Vec::new(),
            next_anchor: 1,
        }
    }

    /// Number of anchors the session is still tracking
    pub fn live_anchors(&self) -> usize {
        self.anchors
            .iter()
            .filter(|(_, state)| !state.borrow().detached)
            .count()
    }

    fn camera_state(&self) -> TrackingState {
        let start = self.settings.pause_at;
        if start > 0 && (start..start + self.settings.pause_frames).contains(&self.frame_index) {
            TrackingState::Paused
        } else {
            TrackingState::Tracking
        }
    }

    fn camera(&self) -> Camera {
        let t = self.frame_index as f32 * self.settings.tick_interval_ms as f32 / 1000.0;
        let yaw = 0.15 * (t * 0.5).sin();
        let rotation = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(CAMERA_PITCH);
        let pose = Pose::new(Vec3::new(0.0, CAMERA_HEIGHT, 0.5), rotation);

        let roll = -(self.geometry.rotation.degrees() as f32).to_radians();
        let display_oriented_pose = pose.compose(&Pose::new(Vec3::ZERO, Quat::from_rotation_z(roll)));
        let aspect_ratio = self.geometry.width.max(1) as f32 / self.geometry.height.max(1) as f32;

        Camera {
            pose,
            display_oriented_pose,
            tracking_state: self.camera_state(),
            fov_y: FOV_Y,
            aspect_ratio,
        }
    }

    fn refine_anchors(&mut self) {
        let every = self.settings.anchor_loss_every;
        self.anchors.retain(|(_, state)| !state.borrow().detached);
        for (id, state) in &self.anchors {
            let mut state = state.borrow_mut();
            state.tracking_state = if every > 0 && (self.frame_index + id.0) % every == 0 {
                TrackingState::Paused
            } else {
                TrackingState::Tracking
            };
        }
    }
}

impl Session for SimulatedSession {
    type Frame = SimFrame;
    type Anchor = SimAnchor;

    fn configure_display(&mut self, rotation: DisplayRotation, width: u32, height: u32) {
        self.geometry = DisplayGeometry {
            rotation,
            width,
            height,
        };
    }

    fn bind_color_texture(&mut self, texture: TextureId) {
        tracing::debug!(texture = texture.0, "camera texture bound");
        self.texture = Some(texture);
    }

    fn next_frame(&mut self) -> Result<SimFrame> {
        self.frame_index += 1;

        let every = self.settings.camera_failure_every;
        if every > 0 && self.frame_index % every == 0 {
            return Err(ArError::camera_unavailable(format!(
                "camera preempted at frame {}",
                self.frame_index
            )));
        }
        if self.texture.is_none() {
            tracing::trace!("no camera texture bound; frame will render black");
        }

        self.refine_anchors();

        let warmth = 1.0 + 0.05 * (self.frame_index as f32 * 0.01).sin();
        Ok(SimFrame {
            camera: self.camera(),
            light: LightEstimate::new(Vec3::new(warmth, 1.0, 2.0 - warmth), 0.55),
            timestamp: Duration::from_millis(self.frame_index * self.settings.tick_interval_ms),
            geometry: self.geometry,
            floor: self.floor.clone(),
            features: Rc::clone(&self.features),
        })
    }

    fn surfaces(&self) -> Vec<Plane> {
        vec![self.floor.clone()]
    }

    fn create_anchor(&mut self, pose: Pose) -> Result<SimAnchor> {
        let id = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        let state = Rc::new(RefCell::new(AnchorState {
            pose,
            tracking_state: TrackingState::Tracking,
            detached: false,
        }));
        self.anchors.push((id, Rc::clone(&state)));
        Ok(SimAnchor { id, state })
    }
}
