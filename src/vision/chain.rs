//! Ordered fallback over image scoring backends.
//!
//! Scorers are tried in registration order. A recoverable failure
//! (backend error, I/O) moves on to the next scorer; anything else stops
//! the chain immediately.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{BackendError, FusionError, Result};
use crate::vision::ImageScorer;

pub struct ScorerChain<I> {
    scorers: Vec<Arc<dyn ImageScorer<I>>>,
}

impl<I> ScorerChain<I> {
    pub fn new() -> Self {
        Self { scorers: Vec::new() }
    }

    /// Append a scorer at the lowest priority
    pub fn register(&mut self, scorer: Arc<dyn ImageScorer<I>>) {
        debug!("Registered image scorer '{}' at priority {}", scorer.name(), self.scorers.len());
        self.scorers.push(scorer);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, scorer: Arc<dyn ImageScorer<I>>) -> Self {
        self.register(scorer);
        self
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    /// Scorer names in priority order
    pub fn names(&self) -> Vec<&str> {
        self.scorers.iter().map(|s| s.name()).collect()
    }
}

impl<I> Default for ScorerChain<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> ImageScorer<I> for ScorerChain<I> {
    fn name(&self) -> &str {
        "chain"
    }

    fn scores(&self, image: &I, prompts: &[&str]) -> Result<Vec<f32>> {
        let mut attempts = Vec::with_capacity(self.scorers.len());
        let mut last_err: Option<FusionError> = None;

        for (i, scorer) in self.scorers.iter().enumerate() {
            match scorer.scores(image, prompts) {
                Ok(scores) => return Ok(scores),
                Err(e) if e.is_recoverable() => {
                    if let Some(next) = self.scorers.get(i + 1) {
                        warn!("Image scorer '{}' failed ({}), falling back to '{}'", scorer.name(), e, next.name());
                    } else {
                        warn!("Image scorer '{}' failed ({}), no fallback left", scorer.name(), e);
                    }
                    attempts.push(scorer.name().to_string());
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match last_err {
            Some(last) => Err(BackendError::Exhausted {
                attempts,
                last: last.to_string(),
            }
            .into()),
            None => Err(BackendError::NoBackend.into()),
        }
    }
}
