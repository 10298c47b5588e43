use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{audio::Mixdown, Result};

/// Where and how rendered audio is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_path: PathBuf,
    pub sample_rate: u32,
}

impl RecordingSettings {
    pub fn new(output_path: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            output_path: output_path.into(),
            sample_rate,
        }
    }
}

/// Writes mono 32-bit float WAV files.
#[derive(Debug)]
pub struct Recorder {
    settings: RecordingSettings,
    written: usize,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            written: 0,
        }
    }

    pub fn write(&mut self, samples: &[f32]) -> Result<()> {
        write_wav(&self.settings.output_path, samples, self.settings.sample_rate)?;
        self.written += samples.len();
        tracing::info!(
            path = %self.settings.output_path.display(),
            samples = samples.len(),
            "wrote audio"
        );
        Ok(())
    }

    pub fn write_mixdown(&mut self, mixdown: &Mixdown) -> Result<()> {
        self.settings.sample_rate = mixdown.sample_rate;
        self.write(&mixdown.samples)
    }

    /// Samples written across every call.
    pub fn samples_written(&self) -> usize {
        self.written
    }
}

pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_readable_float_wav() {
        let path = std::env::temp_dir().join(format!("typewriter-fx-{}.wav", std::process::id()));
        let mut recorder = Recorder::new(RecordingSettings::new(&path, 8_000));
        recorder.write(&[0.0, 0.25, -0.25, 0.5]).unwrap();
        assert_eq!(recorder.samples_written(), 4);

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8_000);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.0, 0.25, -0.25, 0.5]);

        std::fs::remove_file(&path).ok();
    }
}
