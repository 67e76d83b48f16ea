//! # Audio Branch
//!
//! Everything the engine does with raw waveforms: synthesizing mood
//! prototypes, embedding through a pluggable backend, deriving a loudness
//! prior and reading or writing WAV files.
//!
//! ## Usage
//!
//! ```rust
//! use mood_fusion::audio::{LoudnessPrior, PrototypeLibrary};
//! use mood_fusion::labels::LabelSet;
//!
//! let labels = LabelSet::moods();
//! let calm = PrototypeLibrary::new().synthesize("calm").unwrap();
//!
//! let prior = LoudnessPrior::new(&labels).unwrap();
//! let p = prior.estimate(&calm);
//! assert_eq!(labels.get(p.argmax()).unwrap().name, "sad");
//! ```

pub mod embedder;
pub mod loader;
pub mod prior;
pub mod prototypes;
pub mod types;

pub use embedder::{AudioEmbedder, SpectralEmbedder};
pub use loader::AudioLoader;
pub use prior::LoudnessPrior;
pub use prototypes::{Archetype, PrototypeConfig, PrototypeLibrary};
pub use types::{Waveform, TARGET_SAMPLE_RATE};
