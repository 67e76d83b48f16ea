use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    audio::{AudioEmbedder, LoudnessPrior, PrototypeLibrary, Waveform},
    classify::ZeroShotAudioClassifier,
    config::Config,
    error::{ConfigError, FusionError, Result},
    fusion::{blend_audio_evidence, FusionEngine, ProbabilityVector},
    labels::LabelSet,
    vision::{ImageBranch, ImageScorer},
};

/// Which audio evidence feeds the fusion step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    /// Prototype similarity only
    ZeroShot,
    /// RMS loudness prior only, no embedding backend calls
    LoudnessPrior,
    /// Fixed 0.8 / 0.2 blend of zero-shot and prior
    #[default]
    Blended,
}

impl AudioMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroShot => "zero_shot",
            Self::LoudnessPrior => "loudness_prior",
            Self::Blended => "blended",
        }
    }
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioMode {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "zero_shot" | "zeroshot" => Ok(Self::ZeroShot),
            "loudness_prior" | "prior" => Ok(Self::LoudnessPrior),
            "blended" | "blend" => Ok(Self::Blended),
            _ => Err(ConfigError::InvalidValue {
                key: "engine.audio_mode".to_string(),
                value: s.to_string(),
            }
            .into()),
        }
    }
}

/// Probability assigned to one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelProbability {
    pub label: String,
    pub probability: f32,
}

/// Wall-clock time spent in each stage, in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Latency {
    pub image_ms: f64,
    pub audio_ms: f64,
    pub fuse_ms: f64,
    pub total_ms: f64,
}

/// Result of one image + audio prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Top-1 label name
    pub label: String,

    /// Fused distribution in label order
    pub probabilities: Vec<LabelProbability>,

    /// Image branch distribution (frame mean for video input)
    pub image: ProbabilityVector,

    /// Audio branch distribution after the configured mode
    pub audio: ProbabilityVector,

    pub alpha: f32,
    pub audio_mode: AudioMode,

    /// RMS amplitude of the input waveform
    pub rms: f32,

    /// Number of images scored
    pub n_frames: usize,

    pub latency: Latency,
    pub timestamp: DateTime<Utc>,
}

impl Prediction {
    /// Fused probability of a label by name
    pub fn probability(&self, label: &str) -> Option<f32> {
        self.probabilities
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.probability)
    }
}

/// End-to-end mood prediction over one image (or video frames) and a waveform
///
/// The pipeline runs the two branches in sequence:
/// 1. Image scoring - zero-shot scores turned into a label distribution
/// 2. Audio evidence - zero-shot prototype similarity and/or loudness prior
/// 3. Fusion - alpha-weighted blend and top-1 selection
pub struct MoodPipeline<I> {
    image: ImageBranch<I>,
    classifier: ZeroShotAudioClassifier,
    prior: LoudnessPrior,
    engine: FusionEngine,
    audio_mode: AudioMode,
    default_alpha: f32,
}

impl<I> MoodPipeline<I> {
    /// Build a pipeline from a validated configuration and the two backends
    pub fn new(config: &Config, scorer: Arc<dyn ImageScorer<I>>, embedder: Arc<dyn AudioEmbedder>) -> Result<Self> {
        config.validate()?;

        let labels = config.labels.clone();
        let library = PrototypeLibrary::with_config(config.prototypes.clone());
        let classifier = ZeroShotAudioClassifier::new(labels.clone(), library, embedder)?
            .with_temperature(config.engine.temperature)?;

        info!(
            "Mood pipeline ready: {} labels, audio mode {}, image scorer '{}'",
            labels.len(),
            config.engine.audio_mode,
            scorer.name()
        );

        Ok(Self {
            image: ImageBranch::new(labels.clone(), scorer),
            classifier,
            prior: LoudnessPrior::new(&labels)?,
            engine: FusionEngine::new(labels),
            audio_mode: config.engine.audio_mode,
            default_alpha: config.engine.alpha,
        })
    }

    pub fn labels(&self) -> &LabelSet {
        self.engine.labels()
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.audio_mode
    }

    /// Alpha from the configuration, for callers without their own
    pub fn default_alpha(&self) -> f32 {
        self.default_alpha
    }

    pub fn classifier(&self) -> &ZeroShotAudioClassifier {
        &self.classifier
    }

    /// Audio branch distribution under the configured mode
    pub fn audio_distribution(&self, waveform: &Waveform) -> Result<ProbabilityVector> {
        match self.audio_mode {
            AudioMode::ZeroShot => self.classifier.classify(waveform),
            AudioMode::LoudnessPrior => Ok(self.prior.estimate(waveform)),
            AudioMode::Blended => {
                let zero_shot = self.classifier.classify(waveform)?;
                let prior = self.prior.estimate(waveform);
                blend_audio_evidence(&zero_shot, &prior)
            }
        }
    }

    /// Predict the mood of a single image with its soundtrack
    pub fn predict_image_audio(&self, image: &I, waveform: &Waveform, alpha: f32) -> Result<Prediction> {
        let started = Instant::now();

        let p_image = self.image.distribution(image)?;
        let image_ms = elapsed_ms(started);

        self.finish(p_image, 1, waveform, alpha, started, image_ms)
    }

    fn finish(
        &self,
        p_image: ProbabilityVector,
        n_frames: usize,
        waveform: &Waveform,
        alpha: f32,
        started: Instant,
        image_ms: f64,
    ) -> Result<Prediction> {
        let audio_started = Instant::now();
        let p_audio = self.audio_distribution(waveform)?;
        let audio_ms = elapsed_ms(audio_started);

        let fuse_started = Instant::now();
        let fused = self.engine.fuse(&p_image, &p_audio, alpha)?;
        let label = self.engine.top1(&fused)?.name.clone();
        let fuse_ms = elapsed_ms(fuse_started);

        let probabilities = self
            .labels()
            .names()
            .zip(fused.iter())
            .map(|(name, &probability)| LabelProbability {
                label: name.to_string(),
                probability,
            })
            .collect();

        let latency = Latency {
            image_ms,
            audio_ms,
            fuse_ms,
            total_ms: elapsed_ms(started),
        };

        info!("Predicted '{}' (alpha {}, {} frame(s), {:.1} ms)", label, alpha, n_frames, latency.total_ms);
        debug!("Image {:?} / audio {:?}", p_image.as_slice(), p_audio.as_slice());

        Ok(Prediction {
            label,
            probabilities,
            image: p_image,
            audio: p_audio,
            alpha,
            audio_mode: self.audio_mode,
            rms: waveform.rms(),
            n_frames,
            latency,
            timestamp: Utc::now(),
        })
    }
}

impl<I: Sync> MoodPipeline<I> {
    /// Predict the mood of a video from sampled frames and its soundtrack
    ///
    /// The image distribution is the mean of the per-frame distributions.
    pub fn predict_frames_audio(&self, frames: &[I], waveform: &Waveform, alpha: f32) -> Result<Prediction> {
        let started = Instant::now();

        let p_image = self.image.frames_distribution(frames)?;
        let image_ms = elapsed_ms(started);

        self.finish(p_image, frames.len(), waveform, alpha, started, image_ms)
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
