//! Audio clock, drum scheduling and cue playback
//!
//! Procedurally generated sounds - samples are optional.
//!
//! The device clock is the single time source for a run. The drum loop is
//! scheduled a short window ahead of playback by [`DrumScheduler`]; gameplay
//! cues arrive over a channel and play immediately.

pub mod device;
pub mod manager;
pub mod scheduler;
pub mod voice;
#[cfg(target_arch = "wasm32")]
pub mod web;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use device::{AudioDevice, RecordingDevice, ScheduledCue};
pub use manager::{AudioManager, CueSender};
pub use scheduler::DrumScheduler;
pub use voice::{Envelope, Pitch, Source, Voice, Waveform};
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioDevice;

/// Sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Drum loop: low decaying tone on beats 0 and 2
    Kick,
    /// Drum loop: filtered noise on beats 1 and 3
    Snare,
    /// Drum loop: quiet noise tick on every beat
    Hihat,
    /// Player jumped
    Jump,
    /// Rhythm guide reached the player
    Rhythm,
    /// Jump guide reached the player (double beep)
    Warning,
    /// Obstacle collision
    Hit,
    /// Level complete
    Clear,
}

impl Cue {
    pub const ALL: [Cue; 8] = [
        Cue::Kick,
        Cue::Snare,
        Cue::Hihat,
        Cue::Jump,
        Cue::Rhythm,
        Cue::Warning,
        Cue::Hit,
        Cue::Clear,
    ];

    /// Asset key, also used for sample file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Kick => "kick",
            Cue::Snare => "snare",
            Cue::Hihat => "hihat",
            Cue::Jump => "jump",
            Cue::Rhythm => "rhythm",
            Cue::Warning => "warning",
            Cue::Hit => "hit",
            Cue::Clear => "clear",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Cue::ALL.into_iter().find(|c| c.as_str() == s.to_lowercase())
    }

    /// Part of the drum loop rather than a gameplay cue
    pub fn is_drum(&self) -> bool {
        matches!(self, Cue::Kick | Cue::Snare | Cue::Hihat)
    }
}

/// Audio failures. None of them stop a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("failed to load sample '{cue}' from {url}: {reason}")]
    SampleLoad {
        cue: &'static str,
        url: String,
        reason: String,
    },
}
