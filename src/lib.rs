//! Heartbeat Runner - A rhythm runner locked to a generated drum loop
//!
//! Core modules:
//! - `level`: Level tables and the deterministic timeline generator
//! - `audio`: Audio clock, lookahead drum scheduler and cue synthesis
//! - `sim`: Frame-driven simulation (physics, guides, obstacles, scoring)
//! - `game`: Run lifecycle tying audio, input and simulation together
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod game;
pub mod level;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Tempo of the drum loop and every built-in level
    pub const BPM: f64 = 120.0;

    /// World scroll rate: song seconds to pixels
    pub const SCROLL_SPEED: f64 = 10_000.0;
    /// World x of song time zero
    pub const BASE_OFFSET: f64 = 100.0;
    /// Extra forward offset applied to obstacles relative to their beat.
    /// Hand-tuned, not derived from any other constant.
    pub const OBSTACLE_LEAD: f64 = 400.0;
    pub const OBSTACLE_WIDTH: f64 = 40.0;
    pub const OBSTACLE_HEIGHT: f64 = 40.0;

    /// Player defaults (screen space, y grows downward)
    pub const PLAYER_X: f64 = 100.0;
    pub const PLAYER_GROUND_Y: f64 = 300.0;
    pub const PLAYER_SIZE: f64 = 30.0;
    /// Floor line obstacles stand on
    pub const GROUND_LINE: f64 = 330.0;

    /// Vertical physics (px/s², px/s)
    pub const GRAVITY: f64 = 8000.0;
    pub const JUMP_VELOCITY: f64 = -1500.0;
    /// Per-frame physics step; visual only, not audio-exact
    pub const FRAME_DT: f64 = 0.016;

    /// Guide/obstacle trigger window, centred on the player
    pub const TRIGGER_X: f64 = 115.0;
    pub const TRIGGER_HALF_WIDTH: f64 = 100.0;

    pub const STARTING_LIFE: u32 = 5;
    /// Pixels of distance per score point
    pub const SCORE_DIVISOR: f64 = 100.0;

    /// Audio scheduling
    pub const SCHEDULE_AHEAD: f64 = 0.1;
    pub const SCHEDULER_INTERVAL_MS: i32 = 25;
    /// Delay between starting the loop and beat zero
    pub const START_DELAY: f64 = 0.1;
    /// Beats in the repeating drum bar
    pub const DRUM_BAR_BEATS: u32 = 4;
}

/// Seconds per beat at the given tempo
#[inline]
pub fn beat_interval(bpm: f64) -> f64 {
    60.0 / bpm
}

/// Score for a travelled distance: whole hundreds of pixels
#[inline]
pub fn score_for_distance(distance: f64) -> u64 {
    (distance / consts::SCORE_DIVISOR).floor().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_interval_at_default_tempo() {
        assert_eq!(beat_interval(consts::BPM), 0.5);
    }

    #[test]
    fn test_score_formula() {
        assert_eq!(score_for_distance(12345.0), 123);
        assert_eq!(score_for_distance(99.9), 0);
        assert_eq!(score_for_distance(-50.0), 0);
    }
}
