use realfft::RealFftPlanner;

use crate::error::{AudioError, BackendError, Result};

/// Added to band power before taking the log
const POWER_FLOOR: f32 = 1e-10;

/// External audio embedding backend
///
/// Implementations return a fixed-length vector of arbitrary scale; callers
/// L2-normalize before comparing embeddings.
pub trait AudioEmbedder: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Embed a mono waveform
    fn embed(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>>;
}

/// Model-free embedder built from pooled log band energies
///
/// Frames are Hann-windowed and transformed with a real FFT; bin powers are
/// pooled into `bands` equal-width bands, log-compressed, averaged over all
/// frames and mean-centered so the vector describes spectral shape.
pub struct SpectralEmbedder {
    window_size: usize,
    hop_size: usize,
    bands: usize,
}

impl SpectralEmbedder {
    pub fn new() -> Self {
        Self {
            window_size: 1024,
            hop_size: 512,
            bands: 32,
        }
    }

    /// Custom framing; `window_size` must be a power of two
    pub fn with_params(window_size: usize, hop_size: usize, bands: usize) -> Result<Self> {
        if window_size == 0 || !window_size.is_power_of_two() {
            return Err(AudioError::InvalidParameters {
                details: format!("window size {} is not a power of two", window_size),
            }
            .into());
        }
        if hop_size == 0 || hop_size > window_size {
            return Err(AudioError::InvalidParameters {
                details: format!("hop size {} must be in 1..={}", hop_size, window_size),
            }
            .into());
        }
        if bands == 0 || bands > window_size / 2 + 1 {
            return Err(AudioError::InvalidParameters {
                details: format!("band count {} does not fit {} bins", bands, window_size / 2 + 1),
            }
            .into());
        }

        Ok(Self { window_size, hop_size, bands })
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.bands
    }
}

impl Default for SpectralEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEmbedder for SpectralEmbedder {
    fn name(&self) -> &str {
        "spectral"
    }

    fn embed(&self, samples: &[f32], _sample_rate: u32) -> Result<Vec<f32>> {
        if samples.is_empty() {
            return Err(AudioError::InvalidParameters {
                details: "cannot embed an empty waveform".to_string(),
            }
            .into());
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(self.window_size);
        let mut input_buffer = fft.make_input_vec();
        let mut spectrum_buffer = fft.make_output_vec();

        let bins = spectrum_buffer.len();
        let mut band_sums = vec![0.0f32; self.bands];
        let mut frames = 0usize;

        let hann: Vec<f32> = (0..self.window_size)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (self.window_size - 1) as f32).cos()))
            .collect();

        let mut start = 0;
        loop {
            let end = (start + self.window_size).min(samples.len());
            let window = &samples[start..end];

            for (i, slot) in input_buffer.iter_mut().enumerate() {
                *slot = window.get(i).map_or(0.0, |&s| s * hann[i]);
            }

            fft.process(&mut input_buffer, &mut spectrum_buffer)
                .map_err(|e| BackendError::Failed {
                    backend: self.name().to_string(),
                    reason: format!("FFT processing failed: {}", e),
                })?;

            for (band, sum) in band_sums.iter_mut().enumerate() {
                let lo = band * bins / self.bands;
                let hi = ((band + 1) * bins / self.bands).max(lo + 1);
                let power: f32 = spectrum_buffer[lo..hi].iter().map(|c| c.norm_sqr()).sum::<f32>()
                    / (hi - lo) as f32;
                *sum += (power + POWER_FLOOR).ln();
            }
            frames += 1;

            if end == samples.len() {
                break;
            }
            start += self.hop_size;
        }

        let mut embedding: Vec<f32> = band_sums.iter().map(|s| s / frames as f32).collect();
        let mean = embedding.iter().sum::<f32>() / embedding.len() as f32;
        for value in embedding.iter_mut() {
            *value -= mean;
        }

        Ok(embedding)
    }
}
