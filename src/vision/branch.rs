use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{BackendError, FusionError, Result};
use crate::fusion::ProbabilityVector;
use crate::labels::LabelSet;
use crate::vision::ImageScorer;

/// Turn raw per-label scores into a distribution over `k` labels
///
/// Scores are divided by their sum; a zero or negative sum yields the
/// uniform distribution.
pub fn scores_to_distribution(scores: &[f32], k: usize) -> Result<ProbabilityVector> {
    if scores.len() != k {
        return Err(FusionError::DimensionMismatch {
            expected: k,
            actual: scores.len(),
        });
    }
    Ok(ProbabilityVector::normalized(scores))
}

/// Element-wise mean of several distributions of equal length
pub fn mean_distribution(distributions: &[ProbabilityVector]) -> Result<ProbabilityVector> {
    let first = distributions
        .first()
        .ok_or_else(|| FusionError::generic("cannot average an empty list of frames"))?;

    let mut mean = vec![0.0f32; first.len()];
    for p in distributions {
        if p.len() != mean.len() {
            return Err(FusionError::DimensionMismatch {
                expected: mean.len(),
                actual: p.len(),
            });
        }
        for (acc, v) in mean.iter_mut().zip(p.iter()) {
            *acc += v;
        }
    }

    let n = distributions.len() as f32;
    for acc in mean.iter_mut() {
        *acc /= n;
    }

    Ok(ProbabilityVector::normalized(&mean))
}

/// Image side of the engine: a scorer bound to the label prompts
pub struct ImageBranch<I> {
    labels: LabelSet,
    scorer: Arc<dyn ImageScorer<I>>,
}

impl<I> ImageBranch<I> {
    pub fn new(labels: LabelSet, scorer: Arc<dyn ImageScorer<I>>) -> Self {
        Self { labels, scorer }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Distribution for a single image
    pub fn distribution(&self, image: &I) -> Result<ProbabilityVector> {
        let prompts = self.labels.prompts();
        let scores = self.scorer.scores(image, &prompts)?;

        if let Some(bad) = scores.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(BackendError::MalformedResponse {
                backend: self.scorer.name().to_string(),
                details: format!("score {} is not a finite non-negative number", bad),
            }
            .into());
        }

        scores_to_distribution(&scores, self.labels.len())
    }
}

impl<I: Sync> ImageBranch<I> {
    /// Mean distribution over video frames, scored in parallel
    pub fn frames_distribution(&self, frames: &[I]) -> Result<ProbabilityVector> {
        debug!("Scoring {} frames with '{}'", frames.len(), self.scorer.name());

        let per_frame = frames
            .par_iter()
            .map(|frame| self.distribution(frame))
            .collect::<Result<Vec<_>>>()?;

        mean_distribution(&per_frame)
    }
}
