use crate::error::{BackendError, Result};

/// Zero-shot image scoring backend
///
/// Returns one non-negative score per prompt, in prompt order. Scores need
/// not sum to one; [`ImageBranch`](super::ImageBranch) normalizes them.
pub trait ImageScorer<I>: Send + Sync {
    /// Backend name for logging and error reports
    fn name(&self) -> &str;

    /// Score one image against every prompt
    fn scores(&self, image: &I, prompts: &[&str]) -> Result<Vec<f32>>;
}

/// Scorer for images whose scores were computed elsewhere
///
/// The "image" is the score vector itself, which lets callers feed the
/// output of an out-of-process vision model straight into the engine.
pub struct PrecomputedScores;

impl ImageScorer<Vec<f32>> for PrecomputedScores {
    fn name(&self) -> &str {
        "precomputed"
    }

    fn scores(&self, image: &Vec<f32>, prompts: &[&str]) -> Result<Vec<f32>> {
        if image.len() != prompts.len() {
            return Err(BackendError::MalformedResponse {
                backend: self.name().to_string(),
                details: format!("expected {} scores, got {}", prompts.len(), image.len()),
            }
            .into());
        }
        Ok(image.clone())
    }
}
