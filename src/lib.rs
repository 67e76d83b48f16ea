//! # Mood Fusion
//!
//! Classify the mood of a scene from an image (or video frames) and its
//! soundtrack without any labelled training data.
//!
//! Both branches are zero-shot. Images are scored against text prompts by an
//! external vision-language backend; audio is compared against synthesized
//! prototype waveforms, one per mood. The two distributions are then blended
//! with a single weight `alpha`.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use mood_fusion::{
//!     audio::{PrototypeLibrary, SpectralEmbedder},
//!     config::Config,
//!     pipeline::MoodPipeline,
//!     vision::PrecomputedScores,
//! };
//!
//! # fn main() -> mood_fusion::Result<()> {
//! let config = Config::default();
//! let pipeline = MoodPipeline::<Vec<f32>>::new(&config, Arc::new(PrecomputedScores), Arc::new(SpectralEmbedder::new()))?;
//!
//! let image_scores = vec![0.7, 0.1, 0.1, 0.05, 0.05];
//! let soundtrack = PrototypeLibrary::new().synthesize("calm")?;
//!
//! let prediction = pipeline.predict_image_audio(&image_scores, &soundtrack, 0.9)?;
//! assert_eq!(prediction.label, "calm");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`labels`] - Ordered label set shared by every branch
//! - [`vision`] - Image scoring backends and frame aggregation
//! - [`audio`] - Prototypes, embedding, loudness prior, WAV I/O
//! - [`classify`] - Zero-shot audio classification with a prototype cache
//! - [`fusion`] - Alpha-weighted blending of distributions
//! - [`pipeline`] - End-to-end prediction with latency reporting
//! - [`config`] - Configuration management
//!
//! ## Plugging In Backends
//!
//! Real vision-language and audio embedding models live outside this crate.
//! Implement [`ImageScorer`](vision::ImageScorer) for your image type and
//! [`AudioEmbedder`](audio::AudioEmbedder) for your audio model:
//!
//! ```rust,no_run
//! use mood_fusion::vision::ImageScorer;
//! use mood_fusion::Result;
//!
//! struct ClipServer;
//!
//! impl ImageScorer<Vec<u8>> for ClipServer {
//!     fn name(&self) -> &str {
//!         "clip"
//!     }
//!
//!     fn scores(&self, jpeg: &Vec<u8>, prompts: &[&str]) -> Result<Vec<f32>> {
//!         // Send the image and prompts to the model server
//!         Ok(vec![1.0; prompts.len()])
//!     }
//! }
//! ```

pub mod audio;
pub mod classify;
pub mod config;
pub mod error;
pub mod fusion;
pub mod labels;
pub mod pipeline;
pub mod vision;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{FusionError, Result},
    labels::{Label, LabelSet},
    pipeline::{AudioMode, MoodPipeline, Prediction},
};
