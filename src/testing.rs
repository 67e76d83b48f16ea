//! Stub backends shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::audio::{AudioEmbedder, SpectralEmbedder};
use crate::error::{BackendError, Result};
use crate::vision::ImageScorer;

/// Spectral embedder that counts how often it is called
pub struct CountingEmbedder {
    inner: SpectralEmbedder,
    pub calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self {
            inner: SpectralEmbedder::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl AudioEmbedder for CountingEmbedder {
    fn name(&self) -> &str {
        "counting"
    }

    fn embed(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(samples, sample_rate)
    }
}

/// Embedder that succeeds a fixed number of times, then fails
pub struct FailingEmbedder {
    inner: SpectralEmbedder,
    successes: usize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn after(successes: usize) -> Self {
        Self {
            inner: SpectralEmbedder::new(),
            successes,
            calls: AtomicUsize::new(0),
        }
    }
}

impl AudioEmbedder for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    fn embed(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.successes {
            return Err(BackendError::Failed {
                backend: self.name().to_string(),
                reason: format!("call {} refused", call + 1),
            }
            .into());
        }
        self.inner.embed(samples, sample_rate)
    }
}

/// Embedder whose second component is always NaN
pub struct NanEmbedder;

impl AudioEmbedder for NanEmbedder {
    fn name(&self) -> &str {
        "nan"
    }

    fn embed(&self, _samples: &[f32], _sample_rate: u32) -> Result<Vec<f32>> {
        Ok(vec![0.5, f32::NAN, 0.1, 0.2])
    }
}

/// Scorer that returns the same scores for every image
pub struct FixedScorer {
    name: String,
    scores: Vec<f32>,
    pub calls: AtomicUsize,
}

impl FixedScorer {
    pub fn new(name: &str, scores: Vec<f32>) -> Self {
        Self {
            name: name.to_string(),
            scores,
            calls: AtomicUsize::new(0),
        }
    }
}

impl<I> ImageScorer<I> for FixedScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn scores(&self, _image: &I, _prompts: &[&str]) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }
}

/// Scorer that always fails
pub struct DownScorer {
    name: String,
    pub calls: AtomicUsize,
}

impl DownScorer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<I> ImageScorer<I> for DownScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn scores(&self, _image: &I, _prompts: &[&str]) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::Failed {
            backend: self.name.clone(),
            reason: "service unavailable".to_string(),
        }
        .into())
    }
}
