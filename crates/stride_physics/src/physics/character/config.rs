//! Character movement configuration
//!
//! All movement parameters are grouped here for per-agent tuning. Values
//! use metric units (meters, seconds) unless otherwise noted.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Configuration for one character agent's movement resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    /// Capsule height from bottom cap tip to top cap tip (meters)
    pub height: f32,

    /// Capsule radius (meters)
    pub radius: f32,

    /// Maximum obstacle height the agent steps up instead of colliding
    /// against (meters)
    pub step_offset: f32,

    /// Gravity acceleration (meters/second²), applied downward
    pub gravity: f32,

    /// How far below the feet ground is probed (meters)
    pub ground_check_distance: f32,

    /// Safety margin kept between the capsule and obstacles (meters)
    pub skin_width: f32,

    /// Extra hover offset above the detected ground (meters)
    pub ground_offset: f32,

    /// Steepest surface still treated as walkable ground (degrees)
    pub max_slope_angle_deg: f32,

    /// Vertical clamp on the slide-projected motion per tick (meters)
    pub max_climb_per_frame: f32,

    /// Upward smoothing speed toward the ground rest height
    /// (meters/second)
    pub climb_smooth_speed: f32,

    /// Downward smoothing speed toward the ground rest height
    /// (meters/second)
    pub descend_smooth_speed: f32,

    /// Vertical tolerance for snapping onto detected ground (meters)
    pub snap_epsilon: f32,

    /// Rate the agent's up axis aligns to the ground normal (1/second)
    pub ground_align_speed: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            radius: 0.35,
            step_offset: 0.4, // Standard stair height
            gravity: 9.81,
            ground_check_distance: 1.2,
            skin_width: 0.02,
            ground_offset: 0.0,
            max_slope_angle_deg: 50.0,
            max_climb_per_frame: 0.25,
            climb_smooth_speed: 8.0,
            descend_smooth_speed: 12.0,
            snap_epsilon: 0.25,
            ground_align_speed: 10.0,
        }
    }
}

impl Config for CharacterConfig {}

impl CharacterConfig {
    /// Half the capsule height
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Capsule rest height of the center above the ground
    pub fn rest_height(&self) -> f32 {
        self.half_height() + self.ground_offset
    }

    /// Cosine of the maximum walkable slope angle
    ///
    /// Ground hits whose normal has a smaller up component than this are
    /// too steep to stand on.
    pub fn walkable_normal_y(&self) -> f32 {
        self.max_slope_angle_deg.to_radians().cos()
    }
}
