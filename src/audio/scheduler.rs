//! Lookahead drum scheduler
//!
//! A coarse timer polls the scheduler; each poll places every beat that falls
//! inside the lookahead window on the device clock. Timer jitter therefore
//! never reaches the audible beat, as long as polls arrive more often than
//! the window is long.

use crate::consts::{DRUM_BAR_BEATS, SCHEDULE_AHEAD, START_DELAY};

use super::Cue;

/// Drum loop state. Times are device-clock seconds.
#[derive(Debug, Clone)]
pub struct DrumScheduler {
    bpm: f64,
    next_note_time: f64,
    current_beat: u32,
    running: bool,
    schedule_ahead: f64,
    start_delay: f64,
}

impl Default for DrumScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DrumScheduler {
    pub fn new() -> Self {
        Self::with_window(SCHEDULE_AHEAD, START_DELAY)
    }

    pub fn with_window(schedule_ahead: f64, start_delay: f64) -> Self {
        Self {
            bpm: crate::consts::BPM,
            next_note_time: 0.0,
            current_beat: 0,
            running: false,
            schedule_ahead,
            start_delay,
        }
    }

    /// Start the loop at `now` and return the time of beat zero.
    ///
    /// Starting a running loop changes nothing and returns the pending
    /// note time.
    pub fn start(&mut self, now: f64, bpm: f64) -> f64 {
        if self.running {
            return self.next_note_time;
        }
        if !bpm.is_finite() || bpm <= 0.0 {
            log::error!("Refusing to start drum loop at {bpm} BPM");
            return now + self.start_delay;
        }

        self.bpm = bpm;
        self.current_beat = 0;
        self.next_note_time = now + self.start_delay;
        self.running = true;
        log::info!(
            "Drum loop started at {bpm} BPM, first beat at {:.3}s",
            self.next_note_time
        );
        self.next_note_time
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("Drum loop stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn next_note_time(&self) -> f64 {
        self.next_note_time
    }

    /// Beat index within the bar of the next note
    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }

    /// Emit every note due before `now + schedule_ahead`.
    ///
    /// `emit` receives each cue with its device time. Returns the number of
    /// beats placed.
    pub fn poll(&mut self, now: f64, mut emit: impl FnMut(Cue, f64)) -> usize {
        if !self.running {
            return 0;
        }

        let interval = crate::beat_interval(self.bpm);
        let mut beats = 0;
        while self.next_note_time < now + self.schedule_ahead {
            for &cue in beat_cues(self.current_beat) {
                emit(cue, self.next_note_time);
            }
            self.next_note_time += interval;
            self.current_beat = (self.current_beat + 1) % DRUM_BAR_BEATS;
            beats += 1;
        }
        beats
    }
}

/// Percussion for a beat of the bar: hihat always, kick on 0 and 2, snare
/// on the off-beats
pub fn beat_cues(beat: u32) -> &'static [Cue] {
    if beat % 2 == 0 {
        &[Cue::Hihat, Cue::Kick]
    } else {
        &[Cue::Hihat, Cue::Snare]
    }
}
