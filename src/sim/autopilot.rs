//! Demo player
//!
//! Jumps just before each obstacle reaches the player. Drives the headless
//! native run and attract mode.

use super::state::GameState;
use crate::level::Event;

/// Jumps a few frames ahead of every obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autopilot {
    /// Jump no earlier than this many seconds before the obstacle arrives
    max_lead: f64,
    /// Jump no later than this
    min_lead: f64,
}

impl Autopilot {
    /// Autopilot for a display refreshing every `frame_interval` seconds.
    ///
    /// A jump needs one frame to take off, so the window starts just over a
    /// frame out.
    pub fn new(frame_interval: f64) -> Self {
        Self {
            max_lead: frame_interval * 6.0,
            min_lead: frame_interval * 1.2,
        }
    }

    /// Seconds until the nearest un-hit obstacle enters the trigger window
    pub fn next_obstacle_gap(state: &GameState) -> Option<f64> {
        let tuning = &state.tuning;
        let edge = tuning.trigger_x + tuning.trigger_half_width;
        state
            .timeline
            .events
            .iter()
            .filter_map(|event| match *event {
                Event::Obstacle { width, hit, .. } if !hit => {
                    let center = state.screen_x(event.x()) + width / 2.0;
                    Some((center - edge) / tuning.scroll_speed)
                }
                _ => None,
            })
            .filter(|gap| *gap > 0.0)
            .min_by(f64::total_cmp)
    }

    pub fn should_jump(&self, state: &GameState) -> bool {
        if state.player.is_jumping || state.phase.is_over() {
            return false;
        }
        Self::next_obstacle_gap(state).is_some_and(|gap| gap > self.min_lead && gap <= self.max_lead)
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
