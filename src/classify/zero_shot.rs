use std::sync::Arc;

use crate::audio::{AudioEmbedder, PrototypeLibrary, Waveform};
use crate::classify::cache::PrototypeEmbeddingCache;
use crate::error::{ConfigError, FusionError, Result};
use crate::fusion::probability::{dot, l2_normalize, ProbabilityVector, NORMALIZE_EPS};
use crate::labels::LabelSet;

/// Smallest divisor used for temperature scaling
pub const MIN_TEMPERATURE: f32 = 1e-6;

pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Temperature-scaled softmax with a max-shift for stability
///
/// Lower temperatures sharpen the distribution; higher ones flatten it
/// toward uniform.
pub fn softmax_with_temperature(similarities: &[f32], temperature: f32) -> ProbabilityVector {
    let t = temperature.max(MIN_TEMPERATURE);
    let scaled: Vec<f32> = similarities.iter().map(|s| s / t).collect();

    let max = scaled.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return ProbabilityVector::uniform(similarities.len());
    }

    let exp: Vec<f32> = scaled.iter().map(|z| (z - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    // A NaN similarity survives the max fold but poisons the sum
    if !sum.is_finite() || sum <= 0.0 {
        return ProbabilityVector::uniform(similarities.len());
    }
    ProbabilityVector::from_raw(exp.iter().map(|e| e / (sum + NORMALIZE_EPS)).collect())
}

/// Classifies a waveform by cosine similarity to synthesized mood prototypes
pub struct ZeroShotAudioClassifier {
    embedder: Arc<dyn AudioEmbedder>,
    cache: PrototypeEmbeddingCache,
    temperature: f32,
}

impl ZeroShotAudioClassifier {
    /// Build a classifier; fails if a label has no prototype
    pub fn new(labels: LabelSet, library: PrototypeLibrary, embedder: Arc<dyn AudioEmbedder>) -> Result<Self> {
        Ok(Self {
            embedder,
            cache: PrototypeEmbeddingCache::new(labels, library)?,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Set the softmax temperature; must be finite and positive
    pub fn with_temperature(mut self, temperature: f32) -> Result<Self> {
        validate_temperature(temperature)?;
        self.temperature = temperature;
        Ok(self)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn labels(&self) -> &LabelSet {
        self.cache.labels()
    }

    pub fn cache(&self) -> &PrototypeEmbeddingCache {
        &self.cache
    }

    /// Embed all prototypes now instead of on the first classification
    pub fn warm_up(&self) -> Result<()> {
        self.cache.ensure_populated(self.embedder.as_ref()).map(|_| ())
    }

    /// Cosine similarity of the waveform to every prototype, in label order
    pub fn similarities(&self, waveform: &Waveform) -> Result<Vec<f32>> {
        let prototypes = self.cache.ensure_populated(self.embedder.as_ref())?;

        let mut embedding = self.embedder.embed(&waveform.samples, waveform.sample_rate)?;
        l2_normalize(&mut embedding);

        if embedding.len() != prototypes.dim() {
            return Err(FusionError::DimensionMismatch {
                expected: prototypes.dim(),
                actual: embedding.len(),
            });
        }

        Ok(prototypes.iter().map(|proto| dot(&embedding, proto)).collect())
    }

    /// Distribution over labels at the configured temperature
    pub fn classify(&self, waveform: &Waveform) -> Result<ProbabilityVector> {
        self.classify_with_temperature(waveform, self.temperature)
    }

    pub fn classify_with_temperature(&self, waveform: &Waveform, temperature: f32) -> Result<ProbabilityVector> {
        let similarities = self.similarities(waveform)?;
        Ok(softmax_with_temperature(&similarities, temperature))
    }
}

pub(crate) fn validate_temperature(temperature: f32) -> Result<()> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(ConfigError::InvalidValue {
            key: "engine.temperature".to_string(),
            value: temperature.to_string(),
        }
        .into());
    }
    Ok(())
}
