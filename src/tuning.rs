//! Data-driven game balance
//!
//! Defaults reproduce the shipped feel exactly; a JSON overlay can replace any
//! subset of fields for experiments.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Gameplay tunables shared by the generator and the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Song seconds to world pixels
    pub scroll_speed: f64,
    /// World x of song time zero
    pub base_offset: f64,
    /// Extra forward offset for obstacles
    pub obstacle_lead: f64,
    pub obstacle_width: f64,
    pub obstacle_height: f64,

    pub gravity: f64,
    pub jump_velocity: f64,
    pub frame_dt: f64,

    pub player_x: f64,
    pub player_size: f64,
    pub player_ground_y: f64,
    pub ground_line: f64,

    pub trigger_x: f64,
    pub trigger_half_width: f64,

    pub starting_life: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            scroll_speed: SCROLL_SPEED,
            base_offset: BASE_OFFSET,
            obstacle_lead: OBSTACLE_LEAD,
            obstacle_width: OBSTACLE_WIDTH,
            obstacle_height: OBSTACLE_HEIGHT,

            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            frame_dt: FRAME_DT,

            player_x: PLAYER_X,
            player_size: PLAYER_SIZE,
            player_ground_y: PLAYER_GROUND_Y,
            ground_line: GROUND_LINE,

            trigger_x: TRIGGER_X,
            trigger_half_width: TRIGGER_HALF_WIDTH,

            starting_life: STARTING_LIFE,
        }
    }
}

impl Tuning {
    /// Parse a JSON overlay; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// World x of an event at song time `time`
    #[inline]
    pub fn world_x(&self, time: f64) -> f64 {
        self.base_offset + time * self.scroll_speed
    }

    /// Whether a screen x lies inside the trigger window
    #[inline]
    pub fn in_trigger_window(&self, screen_x: f64) -> bool {
        (screen_x - self.trigger_x).abs() < self.trigger_half_width
    }
}
