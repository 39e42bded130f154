//! Per-frame simulation step
//!
//! Advances a run to the current audio time. Time comes from the audio clock,
//! physics from a fixed step.

use super::collision::{guide_in_window, obstacle_collides};
use super::state::{Flash, GamePhase, GameState, RunOutcome};
use crate::audio::{Cue, CueSender};
use crate::level::Event;

/// Shake amplitudes in px
const JUMP_SHAKE: f64 = 8.0;
const JUMP_GUIDE_SHAKE: f64 = 5.0;
const RHYTHM_GUIDE_SHAKE: f64 = 3.0;

/// Discrete player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Space, mouse button or touch
    Jump,
}

/// Actions collected between ticks. Drained completely by each tick; nothing
/// carries over.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: Vec<InputAction>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: InputAction) {
        self.pending.push(action);
    }

    pub fn jump(&mut self) {
        self.push(InputAction::Jump);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, InputAction> {
        self.pending.drain(..)
    }
}

/// Audio may already be torn down; the run continues without sound
fn emit(cues: &CueSender, cue: Cue) {
    let _ = cues.send(cue);
}

/// Advance the run to audio time `now`.
///
/// Order within a frame: input, physics, guides, obstacles, end checks.
/// Returns the outcome on the frame the run ends, `None` otherwise. Ticking
/// a finished run does nothing.
pub fn tick(
    state: &mut GameState,
    input: &mut InputQueue,
    now: f64,
    cues: &CueSender,
) -> Option<RunOutcome> {
    if state.phase.is_over() {
        input.clear();
        return None;
    }

    let GameState {
        tuning,
        timeline,
        start_time,
        phase,
        player,
        stats,
        feedback,
    } = state;

    let song_time = now - *start_time;
    stats.song_time = song_time;
    stats.distance = song_time * tuning.scroll_speed;
    stats.frame += 1;
    feedback.decay();

    // Input
    for action in input.drain() {
        match action {
            InputAction::Jump => {
                if player.try_jump(tuning.jump_velocity) {
                    feedback.shake(JUMP_SHAKE);
                    feedback.flash(Flash::Jump);
                    emit(cues, Cue::Jump);
                }
            }
        }
    }

    player.integrate(tuning.gravity, tuning.frame_dt);

    let distance = stats.distance;

    // Guides
    for event in timeline.events.iter_mut() {
        let screen_x = event.screen_x(distance);
        match event {
            Event::RhythmGuide { triggered, .. } if !*triggered => {
                if guide_in_window(tuning, screen_x) {
                    *triggered = true;
                    feedback.shake(RHYTHM_GUIDE_SHAKE);
                    feedback.flash(Flash::Rhythm);
                    emit(cues, Cue::Rhythm);
                }
            }
            Event::JumpGuide { triggered, .. } if !*triggered => {
                if guide_in_window(tuning, screen_x) {
                    *triggered = true;
                    feedback.shake(JUMP_GUIDE_SHAKE);
                    feedback.flash(Flash::JumpGuide);
                    emit(cues, Cue::Warning);
                }
            }
            _ => {}
        }
    }

    // Obstacles
    for event in timeline.events.iter_mut() {
        let screen_x = event.screen_x(distance);
        if let Event::Obstacle {
            width, height, hit, ..
        } = event
            && !*hit
            && obstacle_collides(tuning, player, screen_x, *width, *height)
        {
            *hit = true;
            stats.life = stats.life.saturating_sub(1);
            stats.miss_count += 1;
            feedback.flash(Flash::Hit);
            emit(cues, Cue::Hit);
            log::debug!(
                "Hit at {:.3}s, life {} (frame {})",
                song_time,
                stats.life,
                stats.frame
            );
        }
    }

    stats.score = crate::score_for_distance(distance);

    if stats.life == 0 {
        *phase = GamePhase::Failed;
        log::info!(
            "Run failed at {:.2}s: score {}, {} misses",
            song_time,
            stats.score,
            stats.miss_count
        );
    } else if song_time > timeline.total_duration {
        *phase = GamePhase::Cleared;
        emit(cues, Cue::Clear);
        log::info!(
            "Run cleared: score {}, {} misses",
            stats.score,
            stats.miss_count
        );
    }

    state.outcome()
}
