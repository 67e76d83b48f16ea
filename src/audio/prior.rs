use crate::audio::types::Waveform;
use crate::error::{ConfigError, Result};
use crate::fusion::ProbabilityVector;
use crate::labels::{LabelSet, CALM, ENERGETIC, JOYFUL, SAD, SUSPENSE};

/// Floor applied to every curve value before renormalizing
pub const PRIOR_FLOOR: f32 = 1e-4;

/// Model-free mood distribution from RMS loudness
///
/// Each mood has a fixed curve over clamped loudness `r` in `[0, 1]`:
/// quiet favors calm and sad, loud favors energetic and joyful, and
/// suspense peaks at mid loudness.
#[derive(Debug, Clone)]
pub struct LoudnessPrior {
    curves: Vec<fn(f32) -> f32>,
}

impl LoudnessPrior {
    /// Bind the curves to a label set; every label needs a curve
    pub fn new(labels: &LabelSet) -> Result<Self> {
        let curves = labels
            .names()
            .map(|name| curve_for(name).ok_or_else(|| ConfigError::UnknownLabel { name: name.to_string() }))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { curves })
    }

    /// Distribution for a raw RMS value
    pub fn from_rms(&self, rms: f32) -> ProbabilityVector {
        let r = if rms.is_nan() { 0.0 } else { rms.clamp(0.0, 1.0) };

        let floored: Vec<f32> = self.curves.iter().map(|curve| curve(r).max(PRIOR_FLOOR)).collect();
        let sum: f32 = floored.iter().sum();

        ProbabilityVector::from_raw(floored.iter().map(|v| v / sum).collect())
    }

    /// Distribution for a waveform's RMS loudness
    pub fn estimate(&self, waveform: &Waveform) -> ProbabilityVector {
        self.from_rms(waveform.rms())
    }
}

fn curve_for(name: &str) -> Option<fn(f32) -> f32> {
    let curve: fn(f32) -> f32 = match name {
        CALM => calm,
        ENERGETIC => energetic,
        SUSPENSE => suspense,
        JOYFUL => joyful,
        SAD => sad,
        _ => return None,
    };
    Some(curve)
}

fn calm(r: f32) -> f32 {
    (1.0 - 2.0 * r).max(0.0)
}

fn energetic(r: f32) -> f32 {
    r.powf(0.8)
}

fn suspense(r: f32) -> f32 {
    0.6 * (1.0 - 2.0 * (r - 0.5).abs())
}

fn joyful(r: f32) -> f32 {
    0.9 * r.powf(0.9) + 0.1 * (1.0 - r)
}

fn sad(r: f32) -> f32 {
    (1.2 - 2.2 * r).max(0.0)
}
