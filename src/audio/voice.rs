//! Synth voice catalog
//!
//! Each cue maps to a fixed recipe: a source (oscillator or noise), a pitch
//! or filter, a gain envelope and a length. The Web Audio device turns a
//! recipe into parameter automation; [`Voice::render`] turns it into PCM.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::Cue;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

impl Waveform {
    /// One sample at `phase` radians
    fn sample(self, phase: f64) -> f64 {
        use std::f64::consts::{PI, TAU};

        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Triangle => 2.0 / PI * phase.sin().asin(),
            Waveform::Sawtooth => {
                let cycles = phase / TAU;
                2.0 * (cycles - (cycles + 0.5).floor())
            }
        }
    }
}

/// Oscillator frequency over the voice's life
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pitch {
    Fixed(f64),
    /// Exponential glide across the whole duration
    Ramp { from: f64, to: f64 },
    /// (offset seconds, hz); each step holds until the next
    Steps(&'static [(f64, f64)]),
}

/// Sound source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    Tone { waveform: Waveform, pitch: Pitch },
    /// White noise through a high-pass filter at `highpass` Hz
    Noise { highpass: f64 },
}

/// Gain over the voice's life
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope {
    /// Exponential decay across the whole duration
    Exponential { from: f64, to: f64 },
    Linear { from: f64, to: f64 },
    /// (offset seconds, level); each level holds until the next
    Gates(&'static [(f64, f64)]),
}

/// A complete synth recipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub source: Source,
    pub envelope: Envelope,
    /// Seconds until the source stops
    pub duration: f64,
}

const WARNING_GATES: &[(f64, f64)] = &[(0.0, 0.15), (0.04, 0.0), (0.05, 0.15), (0.09, 0.0)];
const CLEAR_STEPS: &[(f64, f64)] = &[(0.0, 440.0), (0.1, 554.0), (0.2, 659.0)];

/// Seed for rendered noise; a fixed seed keeps renders reproducible
const NOISE_SEED: u64 = 0x6b69_636b;

impl Voice {
    /// The recipe for a cue
    pub fn for_cue(cue: Cue) -> Self {
        use Envelope::*;

        let tone = |waveform, pitch| Source::Tone { waveform, pitch };
        match cue {
            Cue::Kick => Voice {
                source: tone(Waveform::Sine, Pitch::Ramp { from: 150.0, to: 0.01 }),
                envelope: Exponential { from: 0.8, to: 0.01 },
                duration: 0.5,
            },
            Cue::Snare => Voice {
                source: Source::Noise { highpass: 1000.0 },
                envelope: Exponential { from: 0.4, to: 0.01 },
                duration: 0.2,
            },
            Cue::Hihat => Voice {
                source: Source::Noise { highpass: 5000.0 },
                envelope: Exponential { from: 0.15, to: 0.01 },
                duration: 0.05,
            },
            Cue::Jump => Voice {
                source: tone(Waveform::Sine, Pitch::Ramp { from: 600.0, to: 900.0 }),
                envelope: Exponential { from: 0.5, to: 0.01 },
                duration: 0.15,
            },
            Cue::Rhythm => Voice {
                source: tone(Waveform::Triangle, Pitch::Fixed(800.0)),
                envelope: Exponential { from: 0.1, to: 0.01 },
                duration: 0.05,
            },
            Cue::Warning => Voice {
                source: tone(Waveform::Sine, Pitch::Fixed(1200.0)),
                envelope: Gates(WARNING_GATES),
                duration: 0.1,
            },
            Cue::Hit => Voice {
                source: tone(Waveform::Sawtooth, Pitch::Ramp { from: 100.0, to: 50.0 }),
                envelope: Exponential { from: 0.5, to: 0.01 },
                duration: 0.2,
            },
            Cue::Clear => Voice {
                source: tone(Waveform::Sine, Pitch::Steps(CLEAR_STEPS)),
                envelope: Linear { from: 0.2, to: 0.0 },
                duration: 1.0,
            },
        }
    }

    /// Oscillator frequency `t` seconds in; `None` for noise voices
    pub fn frequency_at(&self, t: f64) -> Option<f64> {
        let Source::Tone { pitch, .. } = self.source else {
            return None;
        };
        Some(match pitch {
            Pitch::Fixed(hz) => hz,
            Pitch::Ramp { from, to } => exp_ramp(from, to, self.progress(t)),
            Pitch::Steps(steps) => step_value(steps, t),
        })
    }

    /// Envelope level `t` seconds in, before volume scaling
    pub fn gain_at(&self, t: f64) -> f64 {
        match self.envelope {
            Envelope::Exponential { from, to } => exp_ramp(from, to, self.progress(t)),
            Envelope::Linear { from, to } => from + (to - from) * self.progress(t),
            Envelope::Gates(gates) => step_value(gates, t),
        }
    }

    fn progress(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (t / self.duration).clamp(0.0, 1.0)
    }

    /// Render mono PCM at `sample_rate`.
    ///
    /// Frequency is integrated sample by sample so glides stay click-free.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f64;
        let len = (self.duration * rate).round() as usize;
        let mut out = Vec::with_capacity(len);

        match self.source {
            Source::Tone { waveform, .. } => {
                let mut phase = 0.0;
                for i in 0..len {
                    let t = i as f64 / rate;
                    let hz = self.frequency_at(t).unwrap_or(0.0);
                    out.push((waveform.sample(phase) * self.gain_at(t)) as f32);
                    phase = (phase + std::f64::consts::TAU * hz / rate) % std::f64::consts::TAU;
                }
            }
            Source::Noise { highpass } => {
                // One-pole high-pass
                let rc = 1.0 / (std::f64::consts::TAU * highpass);
                let alpha = rc / (rc + 1.0 / rate);
                let mut rng = Pcg32::seed_from_u64(NOISE_SEED);
                let (mut prev_in, mut prev_out) = (0.0, 0.0);
                for i in 0..len {
                    let t = i as f64 / rate;
                    let x: f64 = rng.random_range(-1.0..1.0);
                    let y = alpha * (prev_out + x - prev_in);
                    prev_in = x;
                    prev_out = y;
                    out.push((y.clamp(-1.0, 1.0) * self.gain_at(t)) as f32);
                }
            }
        }
        out
    }
}

impl Cue {
    pub fn voice(&self) -> Voice {
        Voice::for_cue(*self)
    }
}

#[inline]
fn exp_ramp(from: f64, to: f64, progress: f64) -> f64 {
    from * (to / from).powf(progress)
}

fn step_value(steps: &[(f64, f64)], t: f64) -> f64 {
    steps
        .iter()
        .take_while(|(offset, _)| *offset <= t)
        .last()
        .or(steps.first())
        .map(|&(_, value)| value)
        .unwrap_or(0.0)
}
