use std::path::Path;

use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use crate::audio::types::{Waveform, TARGET_SAMPLE_RATE};
use crate::error::{AudioError, Result};

/// Input frames per resampler chunk
const RESAMPLE_CHUNK: usize = 1024;
const RESAMPLE_SUB_CHUNKS: usize = 2;

/// WAV reader/writer producing 16 kHz mono waveforms
pub struct AudioLoader;

impl AudioLoader {
    /// Load a WAV file as a 16 kHz mono waveform
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Waveform> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "wav" => Self::load_wav(path),
            _ => Err(AudioError::UnsupportedFormat { format: extension }.into()),
        }
    }

    fn load_wav(path: &Path) -> Result<Waveform> {
        let reader = hound::WavReader::open(path)
            .map_err(|_| AudioError::LoadFailed { path: path.display().to_string() })?;

        let spec = reader.spec();
        let load_failed = || AudioError::LoadFailed { path: path.display().to_string() };

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| load_failed())?,
            hound::SampleFormat::Int => {
                let bit_depth = spec.bits_per_sample;
                reader
                    .into_samples::<i32>()
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| load_failed())?
                    .into_iter()
                    .map(|sample| Self::int_to_float(sample, bit_depth))
                    .collect()
            }
        };

        let mono = Self::downmix(&interleaved, spec.channels);
        let samples = Self::resample(&mono, spec.sample_rate, TARGET_SAMPLE_RATE)?;

        debug!(
            "Loaded {:?}: {} Hz, {} channels -> {} samples at {} Hz",
            path,
            spec.sample_rate,
            spec.channels,
            samples.len(),
            TARGET_SAMPLE_RATE
        );

        Ok(Waveform::new(samples, TARGET_SAMPLE_RATE))
    }

    /// Write a waveform as 16-bit PCM mono WAV
    pub fn save_wav<P: AsRef<Path>>(waveform: &Waveform, path: P) -> Result<()> {
        let path = path.as_ref();
        let write_failed = || AudioError::WriteFailed { path: path.display().to_string() };

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: waveform.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec).map_err(|_| write_failed())?;
        for &sample in &waveform.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value).map_err(|_| write_failed())?;
        }
        writer.finalize().map_err(|_| write_failed())?;

        Ok(())
    }

    /// Average interleaved channels into one
    pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
        if channels <= 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    }

    /// Band-limited resampling through rubato's FFT resampler
    ///
    /// The output is aligned with the input (the filter delay is dropped)
    /// and holds `len * to_rate / from_rate` samples.
    pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
        if from_rate == 0 || to_rate == 0 {
            return Err(AudioError::InvalidParameters {
                details: format!("cannot resample {} Hz -> {} Hz", from_rate, to_rate),
            }
            .into());
        }
        if from_rate == to_rate || samples.is_empty() {
            return Ok(samples.to_vec());
        }

        let invalid = |e: &dyn std::fmt::Display| AudioError::InvalidParameters {
            details: format!("resampling {} Hz -> {} Hz: {}", from_rate, to_rate, e),
        };

        let mut resampler = FftFixedIn::<f32>::new(
            from_rate as usize,
            to_rate as usize,
            RESAMPLE_CHUNK,
            RESAMPLE_SUB_CHUNKS,
            1,
        )
        .map_err(|e| invalid(&e))?;

        let expected = (samples.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
        let delay = resampler.output_delay();
        let mut output = Vec::with_capacity(expected + delay + RESAMPLE_CHUNK);

        let mut pos = 0;
        while samples.len() - pos >= resampler.input_frames_next() {
            let end = pos + resampler.input_frames_next();
            let frame: [&[f32]; 1] = [&samples[pos..end]];
            let chunk = resampler.process(&frame[..], None).map_err(|e| invalid(&e))?;
            output.extend_from_slice(&chunk[0]);
            pos = end;
        }

        if pos < samples.len() {
            let frame: [&[f32]; 1] = [&samples[pos..]];
            let chunk = resampler
                .process_partial(Some(&frame[..]), None)
                .map_err(|e| invalid(&e))?;
            output.extend_from_slice(&chunk[0]);
        }

        // Flush the filter tail
        while output.len() < expected + delay {
            let chunk = resampler
                .process_partial::<&[f32]>(None, None)
                .map_err(|e| invalid(&e))?;
            if chunk[0].is_empty() {
                break;
            }
            output.extend_from_slice(&chunk[0]);
        }

        output.drain(..delay.min(output.len()));
        output.truncate(expected);
        Ok(output)
    }

    /// Convert integer sample to float in range [-1.0, 1.0]
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        match bit_depth {
            8 => (sample as f32 - 128.0) / 128.0,
            16 => sample as f32 / 32768.0,
            24 => sample as f32 / 8388608.0,
            32 => sample as f32 / 2147483648.0,
            _ => sample as f32 / (1i64 << (bit_depth - 1)) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_downmix_stereo() {
        let mono = AudioLoader::downmix(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2);
        assert_eq!(mono, vec![1.5, 3.5, 5.5]);
    }

    fn sine(freq: f32, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_resample_length() {
        let out = AudioLoader::resample(&sine(440.0, 32_000, 32_000), 32_000, 16_000).unwrap();
        assert_eq!(out.len(), 16_000);

        let out = AudioLoader::resample(&sine(440.0, 44_100, 22_050), 44_100, 16_000).unwrap();
        assert_eq!(out.len(), 8_000);
    }

    #[test]
    fn test_resample_keeps_passband_tone() {
        let out = AudioLoader::resample(&sine(1_000.0, 48_000, 48_000), 48_000, 16_000).unwrap();
        let interior = &out[1_000..15_000];
        assert!((rms(interior) - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02);
    }

    #[test]
    fn test_resample_rejects_tone_above_nyquist() {
        // 12 kHz would fold onto 4 kHz without a low-pass
        let out = AudioLoader::resample(&sine(12_000.0, 48_000, 48_000), 48_000, 16_000).unwrap();
        assert_eq!(out.len(), 16_000);
        assert!(rms(&out[1_000..15_000]) < 0.1);
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(AudioLoader::resample(&samples, 16_000, 16_000).unwrap(), samples);
    }

    #[test]
    fn test_resample_zero_rate() {
        assert!(matches!(
            AudioLoader::resample(&[0.1, 0.2], 0, 16_000),
            Err(crate::error::FusionError::Audio(AudioError::InvalidParameters { .. }))
        ));
    }

    #[test]
    fn test_load_resamples_44k_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cd.wav");

        let wave = Waveform::new(sine(500.0, 44_100, 44_100).iter().map(|s| s * 0.5).collect(), 44_100);
        AudioLoader::save_wav(&wave, &path).unwrap();

        let loaded = AudioLoader::load(&path).unwrap();
        assert_eq!(loaded.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(loaded.len(), 16_000);
        assert!((loaded.rms() - wave.rms()).abs() < 0.02);
    }

    #[test]
    fn test_wav_roundtrip_at_target_rate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let samples: Vec<f32> = (0..1600).map(|i| ((i as f32) * 0.05).sin() * 0.5).collect();
        let wave = Waveform::new(samples, TARGET_SAMPLE_RATE);
        AudioLoader::save_wav(&wave, &path).unwrap();

        let loaded = AudioLoader::load(&path).unwrap();
        assert_eq!(loaded.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(loaded.len(), wave.len());
        assert!((loaded.rms() - wave.rms()).abs() < 1e-3);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = AudioLoader::load("clip.mp3");
        assert!(result.is_err());
    }
}
