use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};

use crate::{Result, TypewriterError};

/// Measured properties of a rendered tone.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ToneAnalysis {
    pub dominant_hz: f32,
    pub rms: f32,
    pub peak: f32,
    pub duration_s: f32,
    /// Width of one FFT bin, i.e. the precision of `dominant_hz`.
    pub resolution_hz: f32,
}

/// Spectrum measurements for synthesized tones. The FFT plan is cached and
/// rebuilt only when the block length changes.
pub struct ToneAnalyser {
    sample_rate: u32,
    fft_planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
}

impl ToneAnalyser {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            fft_planner: RealFftPlanner::new(),
            fft: None,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn analyse(&mut self, samples: &[f32]) -> Result<ToneAnalysis> {
        if samples.len() < 2 {
            return Err(TypewriterError::InvalidInput(
                "tone analysis requires at least two samples",
            ));
        }

        let len = samples.len();
        let sample_rate = self.sample_rate.max(1) as f32;
        let resolution_hz = sample_rate / len as f32;
        let dominant_bin = self.dominant_bin(samples)?;

        Ok(ToneAnalysis {
            dominant_hz: dominant_bin as f32 * resolution_hz,
            rms: compute_rms(samples),
            peak: samples.iter().fold(0.0, |acc, s| acc.max(s.abs())),
            duration_s: len as f32 / sample_rate,
            resolution_hz,
        })
    }

    fn dominant_bin(&mut self, samples: &[f32]) -> Result<usize> {
        let len = samples.len();
        let fft = self.prepare_fft(len)?;

        for (index, value) in samples.iter().enumerate() {
            fft.input[index] = *value * hann_value(index, len);
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)?;

        let (bin, _) = fft
            .spectrum
            .iter()
            .enumerate()
            .skip(1)
            .fold((0, 0.0_f32), |best, (index, bin)| {
                let magnitude = bin.norm();
                if magnitude > best.1 {
                    (index, magnitude)
                } else {
                    best
                }
            });
        Ok(bin)
    }

    fn prepare_fft(&mut self, size: usize) -> Result<&mut FftResources> {
        let rebuild = self
            .fft
            .as_ref()
            .map(|fft| fft.size != size)
            .unwrap_or(true);

        if rebuild {
            let plan = self.fft_planner.plan_fft_forward(size);
            let scratch = plan.make_scratch_vec();
            let spectrum = plan.make_output_vec();
            let input = plan.make_input_vec();
            self.fft = Some(FftResources {
                size,
                plan,
                scratch,
                spectrum,
                input,
            });
        }

        self.fft
            .as_mut()
            .ok_or_else(|| TypewriterError::msg("fft resources must exist"))
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl fmt::Debug for ToneAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToneAnalyser")
            .field("sample_rate", &self.sample_rate)
            .field("fft_size", &self.fft.as_ref().map(|fft| fft.size))
            .finish()
    }
}

fn compute_rms(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    (sum / samples.len() as f32).sqrt()
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{audio::synthesize, config::AudioConfig};

    #[test]
    fn finds_the_preset_frequencies() {
        let config = AudioConfig::default();
        let mut analyser = ToneAnalyser::new(config.sample_rate);

        for preset in [config.typing, config.deleting, config.completion] {
            let samples = synthesize(&preset, config.sample_rate);
            let analysis = analyser.analyse(&samples).unwrap();
            let error = (analysis.dominant_hz - preset.frequency_hz).abs();
            assert!(
                error <= analysis.resolution_hz * 1.5,
                "{preset:?} measured {} Hz",
                analysis.dominant_hz
            );
            assert!(analysis.peak <= preset.gain + 1e-6);
            assert!((analysis.duration_s - preset.duration_s).abs() < 1e-3);
        }
    }

    #[test]
    fn silence_has_no_energy() {
        let mut analyser = ToneAnalyser::new(1_000);
        let analysis = analyser.analyse(&[0.0; 64]).unwrap();
        assert_eq!(analysis.rms, 0.0);
        assert_eq!(analysis.peak, 0.0);
    }

    #[test]
    fn rejects_tiny_blocks() {
        let mut analyser = ToneAnalyser::new(1_000);
        assert!(matches!(
            analyser.analyse(&[0.5]),
            Err(TypewriterError::InvalidInput(_))
        ));
    }
}
