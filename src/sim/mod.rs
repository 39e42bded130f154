//! Frame-driven simulation module
//!
//! All gameplay logic lives here:
//! - Time comes from the audio clock, passed in per frame
//! - Physics uses a fixed step
//! - Sounds leave as one-way cue messages
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use collision::{guide_in_window, obstacle_collides, obstacle_in_window};
pub use state::{Feedback, Flash, GamePhase, GameState, Player, Rank, RunOutcome, RunStats};
pub use tick::{InputAction, InputQueue, tick};
