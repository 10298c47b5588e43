use std::f32::consts::TAU;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    config::{AudioConfig, TonePreset, Waveform},
    Result, TypewriterError,
};

/// Level the exponential release ends on, matching a typical
/// `exponentialRampToValueAtTime(0.0001, ..)` envelope.
const RELEASE_FLOOR: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneKind {
    Typing,
    Deleting,
    Completion,
}

/// A tone handed to the output sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEvent {
    pub kind: ToneKind,
    pub preset: TonePreset,
    pub at_ms: u64,
}

/// Destination for tones. Implementations may buffer, mix or discard.
pub trait ToneSink {
    fn play(&mut self, tone: &ToneEvent) -> Result<()>;
}

/// Discards every tone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ToneSink for SilentSink {
    fn play(&mut self, _tone: &ToneEvent) -> Result<()> {
        Ok(())
    }
}

/// Renders a preset into a mono buffer.
pub fn synthesize(preset: &TonePreset, sample_rate: u32) -> Vec<f32> {
    let sample_rate = sample_rate.max(1) as f32;
    let len = (preset.duration_s.max(0.0) * sample_rate).round() as usize;
    if len == 0 || preset.gain <= 0.0 {
        return vec![0.0; len];
    }

    let floor_ratio = (RELEASE_FLOOR / preset.gain).min(1.0);
    (0..len)
        .map(|index| {
            let t = index as f32 / sample_rate;
            let phase = (preset.frequency_hz * t).fract();
            let envelope = preset.gain * floor_ratio.powf(t / preset.duration_s);
            oscillator(preset.waveform, phase) * envelope
        })
        .collect()
}

fn oscillator(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (TAU * phase).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => 2.0 * phase - 1.0,
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
    }
}

/// Session-long buffer the recorder mixes tones into.
#[derive(Debug, Default, Clone)]
pub struct Mixdown {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
    pub tones: Vec<ToneEvent>,
}

/// Shared, cloneable sink that mixes every tone into one timeline buffer.
#[derive(Debug, Clone)]
pub struct ToneRecorder {
    shared: Arc<Mutex<Mixdown>>,
}

impl ToneRecorder {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Mixdown {
                sample_rate,
                ..Default::default()
            })),
        }
    }

    /// Copy of everything recorded so far.
    pub fn mixdown(&self) -> Result<Mixdown> {
        Ok(self.lock()?.clone())
    }

    pub fn tone_count(&self) -> Result<usize> {
        Ok(self.lock()?.tones.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Mixdown>> {
        self.shared
            .lock()
            .map_err(|_| TypewriterError::msg("tone mixdown has been poisoned"))
    }
}

impl ToneSink for ToneRecorder {
    fn play(&mut self, tone: &ToneEvent) -> Result<()> {
        let mut mixdown = self.lock()?;
        let rendered = synthesize(&tone.preset, mixdown.sample_rate);
        let offset = (tone.at_ms as u128 * mixdown.sample_rate as u128 / 1_000) as usize;
        let end = offset + rendered.len();
        if mixdown.samples.len() < end {
            mixdown.samples.resize(end, 0.0);
        }
        for (slot, sample) in mixdown.samples[offset..end].iter_mut().zip(rendered) {
            *slot = (*slot + sample).clamp(-1.0, 1.0);
        }
        mixdown.tones.push(*tone);
        Ok(())
    }
}

/// Audio stays locked until the first user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioUnlock {
    Locked,
    Unlocked,
}

/// Fire-and-forget tone triggers for typing, deleting and completion.
pub struct SoundEffectPlayer {
    config: AudioConfig,
    unlock: AudioUnlock,
    sink: Box<dyn ToneSink>,
    played: u64,
}

impl SoundEffectPlayer {
    pub fn new(config: AudioConfig, sink: Box<dyn ToneSink>) -> Self {
        Self {
            config,
            unlock: AudioUnlock::Locked,
            sink,
            played: 0,
        }
    }

    pub fn silent(config: AudioConfig) -> Self {
        Self::new(config, Box::new(SilentSink))
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enable
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlock == AudioUnlock::Unlocked
    }

    /// Handles a user gesture. Only the first one has any effect; the return
    /// value reports whether this call performed the unlock.
    pub fn unlock(&mut self) -> bool {
        if self.is_unlocked() {
            return false;
        }
        self.unlock = AudioUnlock::Unlocked;
        tracing::info!("audio unlocked and ready");
        true
    }

    /// Number of tones actually delivered to the sink.
    pub fn played(&self) -> u64 {
        self.played
    }

    pub fn typing_sound(&mut self, at_ms: u64) {
        let preset = self.config.typing;
        self.play(ToneKind::Typing, preset, at_ms);
    }

    pub fn delete_sound(&mut self, at_ms: u64) {
        let preset = self.config.deleting;
        self.play(ToneKind::Deleting, preset, at_ms);
    }

    pub fn completion_sound(&mut self, at_ms: u64) {
        let preset = self.config.completion;
        self.play(ToneKind::Completion, preset, at_ms);
    }

    fn play(&mut self, kind: ToneKind, preset: TonePreset, at_ms: u64) {
        if !self.config.enable || !self.is_unlocked() {
            return;
        }
        let tone = ToneEvent { kind, preset, at_ms };
        match self.sink.play(&tone) {
            Ok(()) => self.played += 1,
            Err(err) => tracing::warn!(%err, ?kind, "tone output failed"),
        }
    }
}

impl std::fmt::Debug for SoundEffectPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEffectPlayer")
            .field("enabled", &self.config.enable)
            .field("unlock", &self.unlock)
            .field("played", &self.played)
            .finish()
    }
}
