//! # Image Branch
//!
//! Zero-shot image scoring is delegated to an external vision-language
//! backend behind the [`ImageScorer`] trait. This module turns its scores
//! into distributions over the label set, averages video frames and chains
//! backends with ordered fallback.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use mood_fusion::labels::LabelSet;
//! use mood_fusion::vision::{ImageBranch, PrecomputedScores, ScorerChain};
//!
//! let chain = ScorerChain::<Vec<f32>>::new().with(Arc::new(PrecomputedScores));
//! let branch = ImageBranch::new(LabelSet::moods(), Arc::new(chain));
//!
//! let p = branch.distribution(&vec![0.7, 0.1, 0.1, 0.05, 0.05]).unwrap();
//! assert_eq!(p.argmax(), 0);
//! ```

pub mod branch;
pub mod chain;
pub mod scorer;

pub use branch::{mean_distribution, scores_to_distribution, ImageBranch};
pub use chain::ScorerChain;
pub use scorer::{ImageScorer, PrecomputedScores};
