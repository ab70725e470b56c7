//! Rigid poses in tracking space

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A rigid transform from an object's local frame to world space
///
/// Length units match whatever the perception session reports (meters for
/// every backend seen so far).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in world space
    pub translation: Vec3,
    /// Orientation, kept normalized
    pub rotation: Quat,
}

impl Pose {
    /// The identity pose at the world origin
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose from a translation and rotation
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    /// Create an unrotated pose at the given position
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Get the local-to-world transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Get the inverse (world-to-local) pose
    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            translation: rotation * -self.translation,
            rotation,
        }
    }

    /// Apply this pose to `other`, yielding `self * other`
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose {
            translation: self.transform_point(other.translation),
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    /// Transform a point from local to world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// The local +Y axis in world space
    ///
    /// For plane and hit poses this is the surface normal.
    pub fn y_axis(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Signed distance from the plane through `plane_pose` to `point`
///
/// Positive when `point` lies on the side the plane's +Y normal faces.
pub fn signed_distance_to_plane(plane_pose: &Pose, point: Vec3) -> f32 {
    (point - plane_pose.translation).dot(plane_pose.y_axis())
}
