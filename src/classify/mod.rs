//! # Zero-Shot Audio Classification
//!
//! Scores a waveform against synthesized mood prototypes. Prototype
//! embeddings are computed once per classifier and shared across threads.

pub mod cache;
pub mod zero_shot;

pub use cache::{PrototypeEmbeddingCache, PrototypeEmbeddings};
pub use zero_shot::{softmax_with_temperature, ZeroShotAudioClassifier, DEFAULT_TEMPERATURE, MIN_TEMPERATURE};
