//! Synthetic reference waveforms, one per mood label.
//!
//! Each archetype is a closed-form signal:
//!
//! - **calm**: quiet 220 Hz sine
//! - **energetic**: Gaussian noise burst with a fast attack and slow release
//! - **suspense**: low drone of two close sines (70 Hz + 80 Hz)
//! - **joyful** / **sad**: three-partial additive tones built on 262 Hz,
//!   normalized to unit peak
//!
//! Only the noise burst draws random numbers. Its generator is seeded from
//! [`PrototypeConfig::noise_seed`] unless [`PrototypeConfig::random_noise`]
//! asks for per-process entropy.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::audio::types::{Waveform, TARGET_SAMPLE_RATE};
use crate::error::{ConfigError, Result};
use crate::labels::{LabelSet, CALM, ENERGETIC, JOYFUL, SAD, SUSPENSE};

/// Default seed for the energetic noise burst
pub const DEFAULT_NOISE_SEED: u64 = 42;

const TRIAD_BASE_HZ: f32 = 262.0;
const JOYFUL_RATIO: f32 = 4.0 / 3.0;
const SAD_RATIO: f32 = 3.0 / 2.0;
const PEAK_EPS: f32 = 1e-6;

/// Parameters shared by every prototype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrototypeConfig {
    /// Sample rate of the synthesized waveforms (Hz)
    pub sample_rate: u32,

    /// Length of each prototype in seconds
    pub duration_secs: f32,

    /// Seed for the noise burst
    #[serde(default = "default_noise_seed")]
    pub noise_seed: u64,

    /// Draw the noise burst from OS entropy instead of `noise_seed`
    #[serde(default)]
    pub random_noise: bool,
}

fn default_noise_seed() -> u64 {
    DEFAULT_NOISE_SEED
}

impl Default for PrototypeConfig {
    fn default() -> Self {
        Self {
            sample_rate: TARGET_SAMPLE_RATE,
            duration_secs: 2.0,
            noise_seed: DEFAULT_NOISE_SEED,
            random_noise: false,
        }
    }
}

impl PrototypeConfig {
    /// Number of samples in every prototype
    pub fn num_samples(&self) -> usize {
        (self.sample_rate as f32 * self.duration_secs) as usize
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                key: "prototypes.sample_rate".to_string(),
                value: self.sample_rate.to_string(),
            }
            .into());
        }

        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "prototypes.duration_secs".to_string(),
                value: self.duration_secs.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Acoustic archetype standing in for a mood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    /// Quiet pure tone
    Calm,
    /// Enveloped noise burst
    Energetic,
    /// Two-tone low drone
    Suspense,
    /// Additive tone on a major-like ratio
    Joyful,
    /// Additive tone on a minor-like ratio
    Sad,
}

impl Archetype {
    /// Archetype for a label name, if one exists
    pub fn for_label(name: &str) -> Option<Self> {
        match name {
            CALM => Some(Self::Calm),
            ENERGETIC => Some(Self::Energetic),
            SUSPENSE => Some(Self::Suspense),
            JOYFUL => Some(Self::Joyful),
            SAD => Some(Self::Sad),
            _ => None,
        }
    }
}

/// Deterministic generator of per-label reference waveforms
#[derive(Debug, Clone)]
pub struct PrototypeLibrary {
    config: PrototypeConfig,
}

impl PrototypeLibrary {
    /// Create a library with default parameters (16 kHz, 2 s, fixed seed)
    pub fn new() -> Self {
        Self::with_config(PrototypeConfig::default())
    }

    pub fn with_config(config: PrototypeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrototypeConfig {
        &self.config
    }

    /// Check that every label in the set has an archetype
    pub fn check_labels(&self, labels: &LabelSet) -> Result<()> {
        for name in labels.names() {
            if Archetype::for_label(name).is_none() {
                return Err(ConfigError::UnknownLabel { name: name.to_string() }.into());
            }
        }
        Ok(())
    }

    /// Synthesize the prototype for one label
    pub fn synthesize(&self, label: &str) -> Result<Waveform> {
        let archetype = Archetype::for_label(label)
            .ok_or_else(|| ConfigError::UnknownLabel { name: label.to_string() })?;
        Ok(self.synthesize_archetype(archetype))
    }

    /// Synthesize prototypes for every label, in label order
    pub fn synthesize_all(&self, labels: &LabelSet) -> Result<Vec<(String, Waveform)>> {
        labels
            .names()
            .map(|name| Ok((name.to_string(), self.synthesize(name)?)))
            .collect()
    }

    pub fn synthesize_archetype(&self, archetype: Archetype) -> Waveform {
        let sr = self.config.sample_rate;
        let n = self.config.num_samples();

        let samples = match archetype {
            Archetype::Calm => sine(sr, n, 220.0, 0.08),
            Archetype::Energetic => self.noise_burst(n, 0.35),
            Archetype::Suspense => {
                let low = sine(sr, n, 70.0, 0.18);
                let high = sine(sr, n, 80.0, 0.12);
                low.iter().zip(high.iter()).map(|(a, b)| a + b).collect()
            }
            Archetype::Joyful => triad(sr, n, TRIAD_BASE_HZ, JOYFUL_RATIO, 0.22),
            Archetype::Sad => triad(sr, n, TRIAD_BASE_HZ, SAD_RATIO, 0.20),
        };

        Waveform::new(samples, sr)
    }

    /// Gaussian noise under a 5% linear attack and 15% linear release
    fn noise_burst(&self, n: usize, amplitude: f32) -> Vec<f32> {
        let mut rng = if self.config.random_noise {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(self.config.noise_seed)
        };

        let attack = (0.05 * n as f32) as usize;
        let release = (0.15 * n as f32) as usize;

        (0..n)
            .map(|i| {
                let mut env = 1.0;
                if i < attack {
                    env = ramp(i, attack);
                }
                if i >= n - release {
                    env = 1.0 - ramp(i - (n - release), release);
                }
                let z: f32 = StandardNormal.sample(&mut rng);
                (amplitude * z * env).clamp(-1.0, 1.0)
            })
            .collect()
    }
}

impl Default for PrototypeLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn sine(sample_rate: u32, n: usize, freq: f32, amplitude: f32) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * freq * t).sin()
        })
        .collect()
}

fn triad(sample_rate: u32, n: usize, base: f32, ratio: f32, amplitude: f32) -> Vec<f32> {
    let root = sine(sample_rate, n, base, amplitude);
    let third = sine(sample_rate, n, base * ratio, amplitude * 0.7);
    let octave = sine(sample_rate, n, base * 2.0, amplitude * 0.5);

    let mixed: Vec<f32> = (0..n).map(|i| root[i] + third[i] + octave[i]).collect();
    let peak = mixed.iter().map(|x| x.abs()).fold(0.0f32, f32::max);
    mixed.iter().map(|x| x / (peak + PEAK_EPS)).collect()
}

/// Position `i` on a `len`-point linear ramp from 0 to 1 inclusive
fn ramp(i: usize, len: usize) -> f32 {
    if len <= 1 {
        return 0.0;
    }
    i as f32 / (len - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;

    #[test]
    fn test_every_mood_has_expected_length_and_bounds() {
        let library = PrototypeLibrary::new();
        let prototypes = library.synthesize_all(&LabelSet::moods()).unwrap();

        assert_eq!(prototypes.len(), 5);
        for (name, wave) in &prototypes {
            assert_eq!(wave.len(), 32_000, "{}", name);
            assert_eq!(wave.sample_rate, 16_000);
            assert!(wave.samples.iter().all(|x| (-1.0..=1.0).contains(x)), "{} out of bounds", name);
        }
    }

    #[test]
    fn test_triads_have_unit_peak() {
        let library = PrototypeLibrary::new();
        for label in [JOYFUL, SAD] {
            let wave = library.synthesize(label).unwrap();
            assert!((wave.peak() - 1.0).abs() < 1e-3, "{} peak {}", label, wave.peak());
        }
    }

    #[test]
    fn test_calm_is_quiet() {
        let wave = PrototypeLibrary::new().synthesize(CALM).unwrap();
        assert!(wave.peak() <= 0.08 + 1e-6);
        assert!(wave.rms() < 0.06);
    }

    #[test]
    fn test_joyful_and_sad_differ() {
        let library = PrototypeLibrary::new();
        let joyful = library.synthesize(JOYFUL).unwrap();
        let sad = library.synthesize(SAD).unwrap();
        assert_ne!(joyful.samples, sad.samples);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let a = PrototypeLibrary::new().synthesize(ENERGETIC).unwrap();
        let b = PrototypeLibrary::new().synthesize(ENERGETIC).unwrap();
        assert_eq!(a.samples, b.samples);

        let other = PrototypeLibrary::with_config(PrototypeConfig {
            noise_seed: 7,
            ..Default::default()
        })
        .synthesize(ENERGETIC)
        .unwrap();
        assert_ne!(a.samples, other.samples);
    }

    #[test]
    fn test_missing_seed_falls_back_to_default() {
        let config: PrototypeConfig = toml::from_str("sample_rate = 16000\nduration_secs = 2.0\n").unwrap();
        assert_eq!(config, PrototypeConfig::default());
        assert!(!config.random_noise);

        let a = PrototypeLibrary::with_config(config.clone()).synthesize(ENERGETIC).unwrap();
        let b = PrototypeLibrary::with_config(config).synthesize(ENERGETIC).unwrap();
        assert_eq!(a.samples, b.samples);
    }

    #[test]
    fn test_noise_is_roughly_standard_normal() {
        let wave = PrototypeLibrary::new().synthesize(ENERGETIC).unwrap();
        // Steady-state region between attack and release
        let body = &wave.samples[2_000..26_000];
        let mean = body.iter().sum::<f32>() / body.len() as f32;
        let std = (body.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / body.len() as f32).sqrt();
        assert!(mean.abs() < 0.01, "mean {}", mean);
        assert!((std - 0.35).abs() < 0.02, "std {}", std);
    }

    #[test]
    fn test_noise_envelope_starts_and_ends_silent() {
        let wave = PrototypeLibrary::new().synthesize(ENERGETIC).unwrap();
        assert_eq!(wave.samples[0], 0.0);
        assert_eq!(*wave.samples.last().unwrap(), 0.0);
        assert!(wave.rms() > 0.1);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let library = PrototypeLibrary::new();
        assert!(library.synthesize("nostalgic").is_err());

        let labels = LabelSet::new(vec![Label::new(CALM, "calm"), Label::new("nostalgic", "old")]).unwrap();
        assert!(library.check_labels(&labels).is_err());
        assert!(library.check_labels(&LabelSet::moods()).is_ok());
    }

    #[test]
    fn test_custom_duration() {
        let library = PrototypeLibrary::with_config(PrototypeConfig {
            sample_rate: 8_000,
            duration_secs: 0.5,
            noise_seed: DEFAULT_NOISE_SEED,
            random_noise: true,
        });
        let wave = library.synthesize(SUSPENSE).unwrap();
        assert_eq!(wave.len(), 4_000);
        assert!(wave.peak() <= 0.30 + 1e-6);
    }
}
