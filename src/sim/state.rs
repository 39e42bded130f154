//! Game state and core simulation types
//!
//! Everything a run mutates lives in [`GameState`]; the frame tick is the
//! only writer.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::level::Timeline;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Song playing, input accepted
    Running,
    /// Survived to the end of the song
    Cleared,
    /// Ran out of life
    Failed,
    /// Torn down before it finished; has no result
    Aborted,
}

impl GamePhase {
    pub fn is_over(&self) -> bool {
        !matches!(self, GamePhase::Running)
    }
}

/// The runner. Fixed x; only y moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner, screen space (y grows downward)
    pub pos: DVec2,
    pub size: DVec2,
    /// Vertical velocity, px/s
    pub velocity: f64,
    pub is_jumping: bool,
    pub ground_y: f64,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: DVec2::new(tuning.player_x, tuning.player_ground_y),
            size: DVec2::splat(tuning.player_size),
            velocity: 0.0,
            is_jumping: false,
            ground_y: tuning.player_ground_y,
        }
    }

    /// Leave the ground with `velocity`. Refused while airborne.
    pub fn try_jump(&mut self, velocity: f64) -> bool {
        if self.is_jumping {
            return false;
        }
        self.is_jumping = true;
        self.velocity = velocity;
        true
    }

    /// One fixed physics step. Landing snaps to the ground and ends the jump.
    pub fn integrate(&mut self, gravity: f64, dt: f64) {
        if !self.is_jumping {
            return;
        }
        self.velocity += gravity * dt;
        self.pos.y += self.velocity * dt;

        if self.pos.y >= self.ground_y {
            self.pos.y = self.ground_y;
            self.is_jumping = false;
            self.velocity = 0.0;
        }
    }

    /// Screen y of the player's feet
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.pos.y + self.size.y
    }
}

/// Edge flash kinds, one per feedback source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flash {
    /// Rhythm guide reached the player (yellow)
    Rhythm,
    /// Jump guide reached the player (green)
    JumpGuide,
    /// Player jumped (white)
    Jump,
    /// Obstacle hit (red)
    Hit,
}

impl Flash {
    /// Linear RGB for the renderer
    pub fn color(&self) -> [f32; 3] {
        match self {
            Flash::Rhythm => [1.0, 1.0, 0.0],
            Flash::JumpGuide => [0.0, 1.0, 0.0],
            Flash::Jump => [1.0, 1.0, 1.0],
            Flash::Hit => [1.0, 0.0, 0.0],
        }
    }

    /// Starting intensity; may exceed 1 and is clamped when drawn
    pub fn intensity(&self) -> f64 {
        match self {
            Flash::Rhythm => 0.8,
            Flash::JumpGuide => 1.0,
            Flash::Jump => 1.2,
            Flash::Hit => 1.0,
        }
    }
}

/// Transient visual feedback. Read by the renderer, never by gameplay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub flash: Option<Flash>,
    pub flash_intensity: f64,
    /// Screen shake amplitude in px
    pub shake: f64,
}

impl Feedback {
    const FLASH_DECAY: f64 = 0.04;
    const SHAKE_DECAY: f64 = 0.5;

    pub fn flash(&mut self, flash: Flash) {
        self.flash = Some(flash);
        self.flash_intensity = flash.intensity();
    }

    pub fn shake(&mut self, amount: f64) {
        self.shake = amount;
    }

    /// What the renderer should show under the player's motion preferences
    pub fn presented(&self, settings: &Settings) -> Feedback {
        let mut shown = self.clone();
        if !settings.effective_screen_shake() {
            shown.shake = 0.0;
        }
        if !settings.effective_flashes() {
            shown.flash = None;
            shown.flash_intensity = 0.0;
        }
        shown
    }

    /// Per-frame fade
    pub fn decay(&mut self) {
        self.flash_intensity = (self.flash_intensity - Self::FLASH_DECAY).max(0.0);
        if self.flash_intensity == 0.0 {
            self.flash = None;
        }
        self.shake = (self.shake - Self::SHAKE_DECAY).max(0.0);
    }
}

/// Counters for the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Seconds since beat zero (negative during the lead-in)
    pub song_time: f64,
    /// World pixels scrolled
    pub distance: f64,
    pub score: u64,
    pub life: u32,
    pub miss_count: u32,
    pub frame: u64,
}

/// Result of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub final_score: u64,
    pub cleared: bool,
    pub miss_count: u32,
}

impl RunOutcome {
    pub fn rank(&self) -> Rank {
        Rank::for_outcome(self.cleared, self.miss_count)
    }
}

/// Letter grade shown on the result screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    Perfect,
    A,
    B,
    C,
}

impl Rank {
    pub fn for_outcome(cleared: bool, miss_count: u32) -> Self {
        match (cleared, miss_count) {
            (false, _) => Rank::C,
            (true, 0) => Rank::Perfect,
            (true, 1..=2) => Rank::A,
            (true, _) => Rank::B,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Perfect => "PERFECT",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
        }
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub timeline: Timeline,
    /// Audio time of beat zero
    pub start_time: f64,
    pub phase: GamePhase,
    pub player: Player,
    pub stats: RunStats,
    pub feedback: Feedback,
}

impl GameState {
    pub fn new(timeline: Timeline, start_time: f64, tuning: Tuning) -> Self {
        let player = Player::new(&tuning);
        let stats = RunStats {
            song_time: 0.0,
            distance: 0.0,
            score: 0,
            life: tuning.starting_life,
            miss_count: 0,
            frame: 0,
        };
        Self {
            tuning,
            timeline,
            start_time,
            phase: GamePhase::Running,
            player,
            stats,
            feedback: Feedback::default(),
        }
    }

    /// Outcome once the run has finished. Aborted runs have none.
    pub fn outcome(&self) -> Option<RunOutcome> {
        matches!(self.phase, GamePhase::Cleared | GamePhase::Failed).then(|| RunOutcome {
            final_score: self.stats.score,
            cleared: self.phase == GamePhase::Cleared,
            miss_count: self.stats.miss_count,
        })
    }

    /// Screen x of a world x at the current distance
    #[inline]
    pub fn screen_x(&self, world_x: f64) -> f64 {
        world_x - self.stats.distance
    }
}
