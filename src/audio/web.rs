//! Web Audio output
//!
//! Every cue is synthesized from its [`Voice`] recipe unless a decoded sample
//! has been loaded for it.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AudioBuffer, AudioContext, AudioContextState, BiquadFilterType, GainNode, OscillatorType,
    Response,
};

use super::voice::{Envelope, Pitch, Source, Voice, Waveform};
use super::{AudioDevice, AudioError, Cue};
use crate::platform;

/// Seconds of white noise shared by the snare and hihat
const NOISE_SECONDS: f32 = 2.0;

/// Exponential ramps cannot reach zero
const MIN_RAMP_GAIN: f64 = 1e-4;

pub struct WebAudioDevice {
    ctx: AudioContext,
    noise: Option<AudioBuffer>,
    samples: HashMap<Cue, AudioBuffer>,
}

impl WebAudioDevice {
    /// Create the audio context. Must run inside a user gesture handler or
    /// the context starts suspended.
    pub fn open() -> Result<Self, AudioError> {
        let ctx = AudioContext::new()
            .map_err(|e| AudioError::DeviceUnavailable(format!("{e:?}")))?;

        let noise = noise_buffer(&ctx);
        if noise.is_none() {
            log::warn!("Failed to create noise buffer - snare and hihat disabled");
        }

        Ok(Self {
            ctx,
            noise,
            samples: HashMap::new(),
        })
    }

    pub fn context(&self) -> &AudioContext {
        &self.ctx
    }

    /// Use a decoded sample for `cue` instead of synthesis
    pub fn insert_sample(&mut self, cue: Cue, buffer: AudioBuffer) {
        log::info!("Loaded sample for '{}'", cue.as_str());
        self.samples.insert(cue, buffer);
    }

    /// Gain node wired to the speakers
    fn output(&self) -> Option<GainNode> {
        let gain = self.ctx.create_gain().ok()?;
        gain.connect_with_audio_node(&self.ctx.destination()).ok()?;
        Some(gain)
    }

    fn play_sample(&self, buffer: &AudioBuffer, at: f64, volume: f32) -> Option<()> {
        let source = self.ctx.create_buffer_source().ok()?;
        source.set_buffer(Some(buffer));
        let gain = self.output()?;
        gain.gain().set_value_at_time(volume, at).ok()?;

        source.connect_with_audio_node(&gain).ok()?;
        source.start_with_when(at).ok()?;
        Some(())
    }

    fn play_voice(&self, voice: Voice, at: f64, volume: f32) -> Option<()> {
        let gain = self.output()?;
        apply_envelope(&gain, &voice, at, volume as f64)?;
        let end = at + voice.duration;

        match voice.source {
            Source::Tone { waveform, pitch } => {
                let osc = self.ctx.create_oscillator().ok()?;
                osc.set_type(oscillator_type(waveform));

                let freq = osc.frequency();
                match pitch {
                    Pitch::Fixed(hz) => {
                        freq.set_value_at_time(hz as f32, at).ok()?;
                    }
                    Pitch::Ramp { from, to } => {
                        freq.set_value_at_time(from as f32, at).ok()?;
                        freq.exponential_ramp_to_value_at_time(to as f32, end).ok()?;
                    }
                    Pitch::Steps(steps) => {
                        for &(offset, hz) in steps {
                            freq.set_value_at_time(hz as f32, at + offset).ok()?;
                        }
                    }
                }

                osc.connect_with_audio_node(&gain).ok()?;
                osc.start_with_when(at).ok()?;
                osc.stop_with_when(end).ok()?;
            }
            Source::Noise { highpass } => {
                let noise = self.noise.as_ref()?;
                let source = self.ctx.create_buffer_source().ok()?;
                source.set_buffer(Some(noise));

                let filter = self.ctx.create_biquad_filter().ok()?;
                filter.set_type(BiquadFilterType::Highpass);
                filter.frequency().set_value(highpass as f32);

                source.connect_with_audio_node(&filter).ok()?;
                filter.connect_with_audio_node(&gain).ok()?;
                source.start_with_when(at).ok()?;
                source.stop_with_when(end).ok()?;
            }
        }
        Some(())
    }
}

impl AudioDevice for WebAudioDevice {
    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn resume(&self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    fn schedule(&mut self, cue: Cue, at: f64, volume: f32) {
        self.resume();
        let played = match self.samples.get(&cue) {
            Some(buffer) => self.play_sample(buffer, at, volume),
            None => self.play_voice(cue.voice(), at, volume),
        };
        if played.is_none() {
            log::debug!("Dropped '{}' cue", cue.as_str());
        }
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Triangle => OscillatorType::Triangle,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    }
}

fn apply_envelope(gain: &GainNode, voice: &Voice, at: f64, volume: f64) -> Option<()> {
    let param = gain.gain();
    let end = at + voice.duration;
    match voice.envelope {
        Envelope::Exponential { from, to } => {
            param.set_value_at_time((from * volume) as f32, at).ok()?;
            param
                .exponential_ramp_to_value_at_time((to * volume).max(MIN_RAMP_GAIN) as f32, end)
                .ok()?;
        }
        Envelope::Linear { from, to } => {
            param.set_value_at_time((from * volume) as f32, at).ok()?;
            param
                .linear_ramp_to_value_at_time((to * volume) as f32, end)
                .ok()?;
        }
        Envelope::Gates(gates) => {
            for &(offset, level) in gates {
                param
                    .set_value_at_time((level * volume) as f32, at + offset)
                    .ok()?;
            }
        }
    }
    Some(())
}

fn noise_buffer(ctx: &AudioContext) -> Option<AudioBuffer> {
    let rate = ctx.sample_rate();
    let len = (rate * NOISE_SECONDS) as u32;
    let buffer = ctx.create_buffer(1, len, rate).ok()?;

    let mut rng = Pcg32::seed_from_u64(platform::run_seed());
    let mut data: Vec<f32> = (0..len).map(|_| rng.random_range(-1.0..1.0)).collect();
    buffer.copy_to_channel(&mut data, 0).ok()?;
    Some(buffer)
}

/// Fetch and decode a sample file for `cue`
pub async fn fetch_sample(
    ctx: AudioContext,
    cue: Cue,
    url: String,
) -> Result<AudioBuffer, AudioError> {
    let fail = |reason: String| AudioError::SampleLoad {
        cue: cue.as_str(),
        url: url.clone(),
        reason,
    };

    let window = web_sys::window().ok_or_else(|| fail("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(|e| fail(format!("{e:?}")))?
        .dyn_into()
        .map_err(|_| fail("not a response".into()))?;
    if !response.ok() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let bytes = response.array_buffer().map_err(|e| fail(format!("{e:?}")))?;
    let bytes: js_sys::ArrayBuffer = JsFuture::from(bytes)
        .await
        .map_err(|e| fail(format!("{e:?}")))?
        .dyn_into()
        .map_err(|_| fail("not an array buffer".into()))?;

    let decoded = ctx
        .decode_audio_data(&bytes)
        .map_err(|e| fail(format!("{e:?}")))?;
    JsFuture::from(decoded)
        .await
        .map_err(|e| fail(format!("decode failed: {e:?}")))?
        .dyn_into()
        .map_err(|_| fail("not an audio buffer".into()))
}
