//! Render loop configuration

use serde::{Deserialize, Serialize};

/// Near clip plane distance for the projection matrix
pub const NEAR_CLIP: f32 = 0.1;

/// Far clip plane distance for the projection matrix
pub const FAR_CLIP: f32 = 100.0;

/// Uniform scale applied to every anchored object
pub const OBJECT_SCALE: f32 = 1.0;

/// Tunable render loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// RGBA color the frame is cleared to each tick
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: default_clear_color(),
        }
    }
}

fn default_clear_color() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
