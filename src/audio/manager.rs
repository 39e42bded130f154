//! Audio context object
//!
//! Owns the device, the drum scheduler and the receiving end of the cue
//! channel. Passed explicitly to whoever drives it; there is no global.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::platform;
use crate::settings::Settings;

use super::scheduler::DrumScheduler;
use super::{AudioDevice, AudioError, Cue};

/// Sending half of the cue channel, handed to the simulation
pub type CueSender = Sender<Cue>;

type Opener<D> = Box<dyn FnMut() -> Result<D, AudioError>>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Clock {
    /// Not initialized yet; time reads as zero
    Idle,
    Device,
    /// No device could be opened; monotonic platform time since `origin`
    Fallback { origin: f64 },
}

/// Audio manager for the game
pub struct AudioManager<D: AudioDevice> {
    open: Opener<D>,
    device: Option<D>,
    clock: Clock,
    scheduler: DrumScheduler,
    cue_tx: Sender<Cue>,
    cue_rx: Receiver<Cue>,
    master_volume: f32,
    sfx_volume: f32,
    drum_volume: f32,
    muted: bool,
}

impl<D: AudioDevice + 'static> AudioManager<D> {
    /// Manager that opens its device with `open` on first use.
    ///
    /// Browsers only allow audio after a user gesture, so nothing is opened
    /// here.
    pub fn new(open: impl FnMut() -> Result<D, AudioError> + 'static) -> Self {
        let (cue_tx, cue_rx) = mpsc::channel();
        let settings = Settings::default();
        Self {
            open: Box::new(open),
            device: None,
            clock: Clock::Idle,
            scheduler: DrumScheduler::new(),
            cue_tx,
            cue_rx,
            master_volume: settings.master_volume,
            sfx_volume: settings.sfx_volume,
            drum_volume: settings.drum_volume,
            muted: settings.muted,
        }
    }

    /// Manager around an already constructed device
    pub fn with_device(device: D) -> Self {
        let mut slot = Some(device);
        Self::new(move || {
            slot.take()
                .ok_or_else(|| AudioError::DeviceUnavailable("device already taken".into()))
        })
    }

    /// Manager that never gets a device and runs silent
    pub fn silent() -> Self {
        Self::new(|| Err(AudioError::DeviceUnavailable("audio disabled".into())))
    }
}

impl<D: AudioDevice> AudioManager<D> {
    /// Open the device if needed and wake it. Returns whether sound is
    /// possible.
    ///
    /// A failed open is logged once and the manager falls back to the
    /// platform clock; the run continues silently.
    pub fn init(&mut self) -> bool {
        match self.clock {
            Clock::Idle => match (self.open)() {
                Ok(device) => {
                    device.resume();
                    self.device = Some(device);
                    self.clock = Clock::Device;
                    log::info!("Audio device opened");
                }
                Err(e) => {
                    log::warn!("{e} - continuing without sound");
                    self.clock = Clock::Fallback {
                        origin: platform::now_secs(),
                    };
                }
            },
            Clock::Device => {
                if let Some(device) = &self.device {
                    device.resume();
                }
            }
            Clock::Fallback { .. } => {}
        }
        self.device.is_some()
    }

    /// Current audio time in seconds; 0 before [`init`](Self::init)
    pub fn raw_time(&self) -> f64 {
        match self.clock {
            Clock::Idle => 0.0,
            Clock::Device => self.device.as_ref().map_or(0.0, |d| d.current_time()),
            Clock::Fallback { origin } => (platform::now_secs() - origin).max(0.0),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.clock != Clock::Idle
    }

    /// Whether the manager is running on the fallback clock
    pub fn is_silent(&self) -> bool {
        self.device.is_none()
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }

    /// Start the drum loop and return the device time of beat zero.
    ///
    /// Initializes the device on first call. Calling while the loop runs
    /// returns the pending beat time and restarts nothing.
    pub fn start_drum_loop(&mut self, bpm: f64) -> f64 {
        self.init();
        let first_beat = self.scheduler.start(self.raw_time(), bpm);
        self.scheduler_tick();
        first_beat
    }

    pub fn stop_drum_loop(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_drum_loop_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// One poll of the lookahead scheduler. Driven by a fixed timer,
    /// independent of rendering.
    pub fn scheduler_tick(&mut self) -> usize {
        let now = self.raw_time();
        let volume = self.drum_volume();
        let Self {
            scheduler, device, ..
        } = self;
        scheduler.poll(now, |cue, at| {
            if let Some(device) = device.as_mut()
                && volume > 0.0
            {
                device.schedule(cue, at, volume);
            }
        })
    }

    /// A sender for gameplay cues
    pub fn cue_sender(&self) -> CueSender {
        self.cue_tx.clone()
    }

    /// Play every cue queued on the channel. Returns how many were received.
    pub fn drain_cues(&mut self) -> usize {
        let mut received = 0;
        while let Ok(cue) = self.cue_rx.try_recv() {
            self.play(cue);
            received += 1;
        }
        received
    }

    /// Play a cue immediately
    pub fn play(&mut self, cue: Cue) {
        let volume = self.sfx_volume();
        if volume <= 0.0 {
            return;
        }
        let Some(device) = self.device.as_mut() else {
            return;
        };
        let at = device.current_time();
        device.schedule(cue, at, volume);
    }

    /// Apply volume and mute preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.drum_volume = settings.drum_volume.clamp(0.0, 1.0);
        self.muted = settings.muted;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    fn sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn drum_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.drum_volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingDevice;

    fn full_volume() -> Settings {
        Settings {
            master_volume: 1.0,
            sfx_volume: 1.0,
            drum_volume: 1.0,
            muted: false,
            ..Settings::default()
        }
    }

    #[test]
    fn test_time_is_zero_before_init() {
        let device = RecordingDevice::new();
        device.advance(3.0);
        let audio = AudioManager::with_device(device);
        assert_eq!(audio.raw_time(), 0.0);
        assert!(!audio.is_initialized());
    }

    #[test]
    fn test_device_opened_lazily_and_resumed() {
        let device = RecordingDevice::new();
        let mut audio = AudioManager::with_device(device.clone());
        assert_eq!(device.resume_count(), 0);

        assert!(audio.init());
        assert!(audio.init());
        assert_eq!(device.resume_count(), 2);
    }

    #[test]
    fn test_start_schedules_on_device_clock() {
        let device = RecordingDevice::new();
        device.advance(1.0);
        let mut audio = AudioManager::with_device(device.clone());
        audio.apply_settings(&full_volume());

        let first_beat = audio.start_drum_loop(120.0);
        assert!((first_beat - 1.1).abs() < 1e-9);
        // Beat zero sits exactly at the window edge: not yet placed
        assert!(device.scheduled().is_empty());

        device.advance(0.05);
        audio.scheduler_tick();
        let kick = device.scheduled()[1];
        assert_eq!(kick.cue, Cue::Kick);
        assert!((kick.at - 1.1).abs() < 1e-9);
        assert_eq!(kick.volume, 1.0);
    }

    #[test]
    fn test_unavailable_device_runs_silent() {
        let mut audio: AudioManager<RecordingDevice> = AudioManager::silent();
        assert!(!audio.init());
        assert!(audio.is_silent());

        let first_beat = audio.start_drum_loop(120.0);
        assert!(first_beat >= 0.1);
        assert!(audio.is_drum_loop_running());
        assert!(audio.raw_time() >= 0.0);

        audio.cue_sender().send(Cue::Jump).unwrap();
        assert_eq!(audio.drain_cues(), 1);
    }

    #[test]
    fn test_cues_play_through_channel() {
        let device = RecordingDevice::new();
        let mut audio = AudioManager::with_device(device.clone());
        audio.apply_settings(&full_volume());
        audio.init();
        device.advance(2.5);

        let tx = audio.cue_sender();
        tx.send(Cue::Jump).unwrap();
        tx.send(Cue::Warning).unwrap();
        assert_eq!(audio.drain_cues(), 2);

        let played = device.scheduled();
        assert_eq!(played.len(), 2);
        assert_eq!(played[0].cue, Cue::Jump);
        assert_eq!(played[1].at, 2.5);
    }

    #[test]
    fn test_mute_and_volume() {
        let device = RecordingDevice::new();
        let mut audio = AudioManager::with_device(device.clone());
        audio.init();

        let mut settings = full_volume();
        settings.master_volume = 0.5;
        settings.sfx_volume = 0.5;
        audio.apply_settings(&settings);
        audio.play(Cue::Hit);
        assert_eq!(device.scheduled()[0].volume, 0.25);

        settings.muted = true;
        audio.apply_settings(&settings);
        audio.play(Cue::Hit);
        audio.start_drum_loop(120.0);
        device.advance(1.0);
        audio.scheduler_tick();
        assert_eq!(device.scheduled().len(), 1);
    }

    #[test]
    fn test_stop_halts_scheduling() {
        let device = RecordingDevice::new();
        let mut audio = AudioManager::with_device(device.clone());
        audio.start_drum_loop(120.0);
        audio.stop_drum_loop();
        audio.stop_drum_loop();

        device.advance(5.0);
        assert_eq!(audio.scheduler_tick(), 0);
        assert!(device.scheduled().is_empty());
    }
}
