//! Trigger window and obstacle overlap tests
//!
//! The world scrolls at several hundred pixels per frame, so overlap is a
//! wide window around the player rather than a box intersection.

use super::state::Player;
use crate::tuning::Tuning;

/// Guide at `screen_x` has reached the player
#[inline]
pub fn guide_in_window(tuning: &Tuning, screen_x: f64) -> bool {
    tuning.in_trigger_window(screen_x)
}

/// Obstacle whose left edge is at `screen_x` overlaps the player horizontally
#[inline]
pub fn obstacle_in_window(tuning: &Tuning, screen_x: f64, width: f64) -> bool {
    tuning.in_trigger_window(screen_x + width / 2.0)
}

/// Player's feet are below the top of an obstacle of `height` standing on
/// the ground line
#[inline]
pub fn player_below_top(tuning: &Tuning, player: &Player, height: f64) -> bool {
    player.bottom() > tuning.ground_line - height
}

/// Full obstacle collision test
pub fn obstacle_collides(
    tuning: &Tuning,
    player: &Player,
    screen_x: f64,
    width: f64,
    height: f64,
) -> bool {
    obstacle_in_window(tuning, screen_x, width) && player_below_top(tuning, player, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obstacle_window_uses_center() {
        let tuning = Tuning::default();
        // Center at 115 + 99
        assert!(obstacle_in_window(&tuning, 194.0, 40.0));
        // Center at 115 + 100
        assert!(!obstacle_in_window(&tuning, 195.0, 40.0));
        assert!(obstacle_in_window(&tuning, 0.0, 40.0));
        assert!(!obstacle_in_window(&tuning, -85.0, 40.0));
    }

    #[test]
    fn test_grounded_player_collides() {
        let tuning = Tuning::default();
        let player = Player::new(&tuning);
        assert!(obstacle_collides(&tuning, &player, 95.0, 40.0, 40.0));
    }

    #[test]
    fn test_airborne_player_clears() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        player.pos.y = 259.0;
        assert!(!obstacle_collides(&tuning, &player, 95.0, 40.0, 40.0));
        // Feet exactly at the obstacle top still clear
        player.pos.y = 260.0;
        assert!(!player_below_top(&tuning, &player, 40.0));
        player.pos.y = 260.5;
        assert!(player_below_top(&tuning, &player, 40.0));
    }
}
