//! Audio output devices

use std::cell::RefCell;
use std::rc::Rc;

use super::Cue;

/// An output with its own sample clock.
///
/// The clock is the only authority on time during a run: the simulation and
/// the drum scheduler both read it, and cues are placed on it.
pub trait AudioDevice {
    /// Device time in seconds. Monotone.
    fn current_time(&self) -> f64;

    /// Wake a suspended device (browsers hold output until a user gesture)
    fn resume(&self) {}

    /// Play `cue` at device time `at` with linear `volume` in 0..=1
    fn schedule(&mut self, cue: Cue, at: f64, volume: f32);
}

/// One cue placed on a device clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledCue {
    pub cue: Cue,
    /// Playback time
    pub at: f64,
    pub volume: f32,
    /// Device time when the cue was handed over
    pub requested: f64,
}

#[derive(Debug, Default)]
struct Recording {
    time: f64,
    scheduled: Vec<ScheduledCue>,
    resumed: u32,
}

/// Silent device with a hand-driven clock.
///
/// Clones share one recording, so a test can keep a handle while the audio
/// manager owns the device. Also backs the native headless runner.
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, time: f64) {
        let mut inner = self.inner.borrow_mut();
        debug_assert!(time >= inner.time, "device clock went backwards");
        inner.time = inner.time.max(time);
    }

    pub fn advance(&self, dt: f64) {
        self.inner.borrow_mut().time += dt.max(0.0);
    }

    /// Everything scheduled so far, in scheduling order
    pub fn scheduled(&self) -> Vec<ScheduledCue> {
        self.inner.borrow().scheduled.clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.inner
            .borrow()
            .scheduled
            .iter()
            .filter(|s| s.cue == cue)
            .count()
    }

    pub fn resume_count(&self) -> u32 {
        self.inner.borrow().resumed
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().scheduled.clear();
    }
}

impl AudioDevice for RecordingDevice {
    fn current_time(&self) -> f64 {
        self.inner.borrow().time
    }

    fn resume(&self) {
        self.inner.borrow_mut().resumed += 1;
    }

    fn schedule(&mut self, cue: Cue, at: f64, volume: f32) {
        let mut inner = self.inner.borrow_mut();
        let requested = inner.time;
        inner.scheduled.push(ScheduledCue {
            cue,
            at,
            volume,
            requested,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_recording() {
        let device = RecordingDevice::new();
        let mut handle = device.clone();
        handle.schedule(Cue::Kick, 0.1, 1.0);
        device.advance(0.25);

        assert_eq!(device.count(Cue::Kick), 1);
        assert_eq!(handle.current_time(), 0.25);
    }

    #[test]
    fn test_clock_never_rewinds() {
        let device = RecordingDevice::new();
        device.advance(1.0);
        device.advance(-5.0);
        assert_eq!(device.current_time(), 1.0);
    }
}
