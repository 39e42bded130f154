//! Run lifecycle
//!
//! Ties the audio manager, the input queue and the simulation together for
//! one player. Platform entry points own a `Game` and call [`Game::frame`]
//! from the display loop and [`Game::scheduler_tick`] from a fixed timer.

use crate::audio::{AudioDevice, AudioManager, CueSender};
use crate::level::{self, Level, LevelError};
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, InputQueue, RunOutcome, tick};
use crate::tuning::Tuning;

pub struct Game<D: AudioDevice> {
    pub audio: AudioManager<D>,
    pub input: InputQueue,
    pub settings: Settings,
    tuning: Tuning,
    cues: CueSender,
    state: Option<GameState>,
}

impl<D: AudioDevice> Game<D> {
    pub fn new(mut audio: AudioManager<D>, tuning: Tuning, settings: Settings) -> Self {
        audio.apply_settings(&settings);
        let cues = audio.cue_sender();
        Self {
            audio,
            input: InputQueue::new(),
            settings,
            tuning,
            cues,
            state: None,
        }
    }

    /// Start a run of `level`: drum loop first, then a timeline anchored to
    /// its first beat. Any run in progress is replaced.
    ///
    /// Malformed levels are rejected before the drum loop starts.
    pub fn start(&mut self, level: &Level, seed: u64) -> Result<f64, LevelError> {
        level.validate()?;

        self.audio.stop_drum_loop();
        self.input.clear();
        let first_beat = self.audio.start_drum_loop(level.bpm);
        let timeline = level::generate_seeded(level, &self.tuning, seed)?;

        log::info!(
            "Starting '{}' ({:.0}s, {} events, seed {seed}) at {first_beat:.3}s",
            level.name,
            timeline.total_duration,
            timeline.len()
        );
        self.state = Some(GameState::new(timeline, first_beat, self.tuning.clone()));
        Ok(first_beat)
    }

    /// One display frame. Returns the outcome on the frame the run ends.
    pub fn frame(&mut self) -> Option<RunOutcome> {
        let state = self.state.as_mut()?;
        let now = self.audio.raw_time();
        let outcome = tick(state, &mut self.input, now, &self.cues);
        self.audio.drain_cues();

        if outcome.is_some() {
            self.audio.stop_drum_loop();
        }
        outcome
    }

    /// One poll of the drum scheduler
    pub fn scheduler_tick(&mut self) -> usize {
        self.audio.scheduler_tick()
    }

    /// Queue a jump for the next frame. Also unlocks audio: browsers need
    /// the gesture.
    pub fn jump(&mut self) {
        self.audio.init();
        self.input.jump();
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.state.as_ref().is_some_and(|s| !s.phase.is_over())
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio.apply_settings(&settings);
        self.settings = settings;
    }

    /// Stop the drum loop and abort a run still in progress. Later frames
    /// do nothing until the next [`start`](Self::start). Safe to call
    /// repeatedly.
    pub fn stop(&mut self) {
        self.audio.stop_drum_loop();
        self.input.clear();
        if let Some(state) = self.state.as_mut()
            && !state.phase.is_over()
        {
            state.phase = GamePhase::Aborted;
            log::info!("Run aborted at {:.2}s", state.stats.song_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Cue, RecordingDevice};
    use crate::level::Phase;

    fn short_level() -> Level {
        Level::new("short", 120.0, vec![Phase::new("4/4", 4, 2, 3, 1, vec![vec![0.0, 1.0]])])
    }

    fn game(device: &RecordingDevice) -> Game<RecordingDevice> {
        Game::new(
            AudioManager::with_device(device.clone()),
            Tuning::default(),
            Settings::default(),
        )
    }

    #[test]
    fn test_no_frames_before_start() {
        let device = RecordingDevice::new();
        let mut game = game(&device);
        assert_eq!(game.frame(), None);
        assert!(!game.is_running());
    }

    #[test]
    fn test_malformed_level_starts_nothing() {
        let device = RecordingDevice::new();
        let mut game = game(&device);
        let bad = Level::new("bad", 120.0, vec![]);

        assert!(game.start(&bad, 1).is_err());
        assert!(!game.audio.is_drum_loop_running());
        assert!(game.state().is_none());
    }

    #[test]
    fn test_run_anchored_to_first_beat() {
        let device = RecordingDevice::new();
        device.advance(4.0);
        let mut game = game(&device);

        let first_beat = game.start(&short_level(), 7).unwrap();
        assert!((first_beat - 4.1).abs() < 1e-9);
        assert_eq!(game.state().unwrap().start_time, first_beat);
        assert!(game.audio.is_drum_loop_running());
    }

    #[test]
    fn test_cues_reach_device_and_loop_stops_at_end() {
        let device = RecordingDevice::new();
        let mut game = game(&device);
        game.start(&short_level(), 7).unwrap();

        let mut outcome = None;
        for _ in 0..400 {
            device.advance(1.0 / 60.0);
            game.scheduler_tick();
            if let Some(done) = game.frame() {
                outcome = Some(done);
                break;
            }
        }

        let outcome = outcome.unwrap();
        assert!(outcome.cleared);
        assert!(!game.audio.is_drum_loop_running());
        assert_eq!(device.count(Cue::Clear), 1);
        assert_eq!(device.count(Cue::Warning), 1);
        assert_eq!(device.count(Cue::Hit), 1);
        assert!(device.count(Cue::Kick) >= 2);

        game.stop();
        game.stop();
        assert_eq!(game.frame(), None);
        assert_eq!(game.state().unwrap().phase, GamePhase::Cleared);
    }

    #[test]
    fn test_stop_freezes_run_until_restart() {
        let device = RecordingDevice::new();
        let mut game = game(&device);
        game.start(&crate::level::builtin::heartbeat(), 3).unwrap();
        device.advance(0.5);
        game.frame();

        game.stop();
        assert!(!game.is_running());
        assert!(!game.audio.is_drum_loop_running());
        let frozen = game.state().unwrap().stats.clone();

        // Ten seconds of frames would otherwise hit five obstacles
        for _ in 0..600 {
            device.advance(1.0 / 60.0);
            game.jump();
            assert_eq!(game.frame(), None);
        }
        let state = game.state().unwrap();
        assert_eq!(state.phase, GamePhase::Aborted);
        assert_eq!(state.stats, frozen);
        assert_eq!(state.outcome(), None);
        assert_eq!(device.count(Cue::Hit), 0);

        game.start(&short_level(), 4).unwrap();
        assert!(game.is_running());
        assert!(game.audio.is_drum_loop_running());
    }
}
