//! # Fusion
//!
//! Pure, stateless combination of per-modality distributions.
//!
//! ```rust
//! use mood_fusion::fusion::{fuse, FusionEngine};
//! use mood_fusion::labels::LabelSet;
//!
//! let engine = FusionEngine::new(LabelSet::moods());
//! let p_image = [1.0, 0.0, 0.0, 0.0, 0.0];
//! let p_audio = [0.0, 1.0, 0.0, 0.0, 0.0];
//!
//! let fused = engine.fuse(&p_image, &p_audio, 0.9).unwrap();
//! assert_eq!(engine.top1(&fused).unwrap().name, "calm");
//! # let _ = fuse(&p_image, &p_audio, 0.5).unwrap();
//! ```

pub mod engine;
pub mod probability;

pub use engine::{blend_audio_evidence, fuse, FusionEngine, LOUDNESS_PRIOR_WEIGHT, ZERO_SHOT_WEIGHT};
pub use probability::{normalize, ProbabilityVector};
