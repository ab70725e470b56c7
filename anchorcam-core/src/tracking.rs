//! Per-frame tracking data reported by the perception session

use crate::math::Pose;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether a pose estimate is currently being refined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingState {
    /// Actively tracked
    Tracking,
    /// Temporarily unavailable, may resume
    Paused,
    /// Permanently lost
    Stopped,
}

impl TrackingState {
    /// Whether the state is `Tracking`
    pub fn is_tracking(self) -> bool {
        self == TrackingState::Tracking
    }
}

/// The device camera as seen in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Sensor pose in world space
    pub pose: Pose,
    /// Pose rotated to match the current display orientation
    pub display_oriented_pose: Pose,
    /// Camera tracking state
    pub tracking_state: TrackingState,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio of the display viewport (width / height)
    pub aspect_ratio: f32,
}

impl Camera {
    /// Create a camera whose display orientation matches its sensor pose
    pub fn new(pose: Pose, tracking_state: TrackingState, fov_y: f32, aspect_ratio: f32) -> Self {
        Self {
            pose,
            display_oriented_pose: pose,
            tracking_state,
            fov_y,
            aspect_ratio,
        }
    }

    /// Get the view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        self.display_oriented_pose.inverse().to_matrix()
    }

    /// Get the projection matrix for the given clip planes
    pub fn projection_matrix(&self, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect_ratio, near, far)
    }
}

/// Scene illumination estimate for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightEstimate {
    /// Per-channel color scale factors
    pub color_scale: Vec3,
    /// Average pixel intensity in `[0, 1]`
    pub pixel_intensity: f32,
    /// Whether the session produced a usable estimate this frame
    pub valid: bool,
}

impl LightEstimate {
    /// Create a valid estimate
    pub fn new(color_scale: Vec3, pixel_intensity: f32) -> Self {
        Self {
            color_scale,
            pixel_intensity,
            valid: true,
        }
    }

    /// An estimate flagged as unusable
    pub fn invalid() -> Self {
        Self {
            color_scale: Vec3::ZERO,
            pixel_intensity: 0.0,
            valid: false,
        }
    }

    /// Color correction `[r, g, b, intensity]` for object shading
    ///
    /// All zeros when the estimate is invalid.
    pub fn color_correction(&self) -> [f32; 4] {
        if !self.valid {
            return [0.0; 4];
        }
        [
            self.color_scale.x,
            self.color_scale.y,
            self.color_scale.z,
            self.pixel_intensity,
        ]
    }
}

impl Default for LightEstimate {
    fn default() -> Self {
        Self::new(Vec3::ONE, 1.0)
    }
}

/// A detected planar surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Session-assigned identifier
    pub id: u64,
    /// Center of the plane; local +Y is the surface normal
    pub center_pose: Pose,
    /// Boundary polygon in the plane's local X/Z coordinates
    pub polygon: Vec<Vec2>,
    /// Plane tracking state
    pub tracking_state: TrackingState,
}

impl Plane {
    /// Create a tracked plane
    pub fn new(id: u64, center_pose: Pose, polygon: Vec<Vec2>) -> Self {
        Self {
            id,
            center_pose,
            polygon,
            tracking_state: TrackingState::Tracking,
        }
    }

    /// Create a tracked rectangular plane with the given half extents
    pub fn rectangle(id: u64, center_pose: Pose, half_x: f32, half_z: f32) -> Self {
        Self::new(
            id,
            center_pose,
            vec![
                Vec2::new(-half_x, -half_z),
                Vec2::new(half_x, -half_z),
                Vec2::new(half_x, half_z),
                Vec2::new(-half_x, half_z),
            ],
        )
    }

    /// Whether `pose` projects into the plane's boundary polygon
    pub fn contains_pose(&self, pose: &Pose) -> bool {
        let local = self.center_pose.inverse().transform_point(pose.translation);
        polygon_contains(&self.polygon, Vec2::new(local.x, local.z))
    }
}

// Even-odd rule; points exactly on an edge may land either way.
fn polygon_contains(polygon: &[Vec2], point: Vec2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// How an oriented point's pose orientation was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrientationMode {
    /// Orientation is the identity at initialization; carries no surface info
    Initialized,
    /// Orientation follows the surface normal estimated around the point
    EstimatedSurfaceNormal,
}

/// The trackable a ray intersected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HitTrackable {
    /// A detected plane
    Plane(Plane),
    /// A feature point with orientation data
    Point {
        /// How the point's orientation was derived
        orientation: OrientationMode,
    },
}

/// Discriminant of [`HitTrackable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackableKind {
    /// Surface plane
    Plane,
    /// Oriented point
    Point,
}

impl HitTrackable {
    /// Get the kind of trackable
    pub fn kind(&self) -> TrackableKind {
        match self {
            HitTrackable::Plane(_) => TrackableKind::Plane,
            HitTrackable::Point { .. } => TrackableKind::Point,
        }
    }
}

/// One ray intersection returned by a hit test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitCandidate {
    /// The intersected trackable
    pub trackable: HitTrackable,
    /// Intersection pose; +Y is the surface normal at the hit
    pub pose: Pose,
    /// Distance from the ray origin
    pub distance: f32,
}

/// An immutable per-tick snapshot from the perception session
pub trait Frame {
    /// The camera for this frame
    fn camera(&self) -> &Camera;

    /// Scene illumination estimate
    fn light_estimate(&self) -> LightEstimate;

    /// Capture timestamp relative to session start
    fn timestamp(&self) -> Duration;

    /// Cast a ray through screen coordinates
    ///
    /// Candidates are ordered nearest first.
    fn hit_test(&self, x: f32, y: f32) -> Vec<HitCandidate>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn rectangle_contains_center_not_outside() {
        let plane = Plane::rectangle(1, Pose::from_translation(Vec3::new(0.0, 0.0, -2.0)), 1.0, 1.0);
        assert!(plane.contains_pose(&Pose::from_translation(Vec3::new(0.2, 0.0, -2.3))));
        assert!(!plane.contains_pose(&Pose::from_translation(Vec3::new(1.5, 0.0, -2.0))));
        assert!(!plane.contains_pose(&Pose::from_translation(Vec3::new(0.0, 0.0, 0.0))));
    }

    #[test]
    fn containment_respects_plane_rotation() {
        // Wall facing +Z: local X/Z maps to world X/-Y
        let wall = Pose::new(Vec3::new(0.0, 1.0, -3.0), Quat::from_rotation_x(std::f32::consts::FRAC_PI_2));
        let plane = Plane::rectangle(2, wall, 0.5, 0.5);
        assert!(plane.contains_pose(&Pose::from_translation(Vec3::new(0.1, 1.3, -3.0))));
        assert!(!plane.contains_pose(&Pose::from_translation(Vec3::new(0.1, 2.0, -3.0))));
    }

    #[test]
    fn concave_polygon() {
        // L-shape missing the upper-right quadrant
        let polygon = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        assert!(polygon_contains(&polygon, Vec2::new(0.5, 1.5)));
        assert!(polygon_contains(&polygon, Vec2::new(1.5, 0.5)));
        assert!(!polygon_contains(&polygon, Vec2::new(1.5, 1.5)));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!polygon_contains(&[Vec2::ZERO, Vec2::X], Vec2::ZERO));
    }

    #[test]
    fn invalid_light_estimate_zeroes_correction() {
        assert_eq!(LightEstimate::invalid().color_correction(), [0.0; 4]);
        let estimate = LightEstimate::new(Vec3::new(0.9, 1.0, 1.1), 0.5);
        assert_eq!(estimate.color_correction(), [0.9, 1.0, 1.1, 0.5]);
    }

    #[test]
    fn view_matrix_maps_camera_to_origin() {
        let camera = Camera::new(
            Pose::from_translation(Vec3::new(0.0, 1.5, 0.0)),
            TrackingState::Tracking,
            1.0,
            0.5,
        );
        let eye = camera.view_matrix().transform_point3(Vec3::new(0.0, 1.5, 0.0));
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-5));
    }
}
