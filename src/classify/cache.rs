use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::audio::{AudioEmbedder, PrototypeLibrary};
use crate::error::{BackendError, FusionError, Result};
use crate::fusion::probability::l2_normalize;
use crate::labels::LabelSet;

/// Unit-norm prototype embeddings in label order
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeEmbeddings {
    vectors: Vec<Vec<f32>>,
}

impl PrototypeEmbeddings {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Shared embedding dimension
    pub fn dim(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.vectors.iter().map(Vec::as_slice)
    }
}

/// Lazily populated, write-once store of prototype embeddings
///
/// Population runs under a mutex: concurrent first callers wait for a
/// single embedding pass and then share its result. A backend failure
/// leaves the cache empty so the next call starts over.
pub struct PrototypeEmbeddingCache {
    labels: LabelSet,
    library: PrototypeLibrary,
    slot: Mutex<Option<Arc<PrototypeEmbeddings>>>,
}

impl PrototypeEmbeddingCache {
    pub fn new(labels: LabelSet, library: PrototypeLibrary) -> Result<Self> {
        library.check_labels(&labels)?;
        Ok(Self {
            labels,
            library,
            slot: Mutex::new(None),
        })
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn is_populated(&self) -> bool {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).is_some()
    }

    /// Embed every prototype on the first call; later calls return the cached set
    pub fn ensure_populated(&self, embedder: &dyn AudioEmbedder) -> Result<Arc<PrototypeEmbeddings>> {
        // A panic mid-population never stores a value, so a poisoned slot is still consistent
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }

        info!(
            "Embedding {} audio prototypes with backend '{}'",
            self.labels.len(),
            embedder.name()
        );

        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(self.labels.len());
        for name in self.labels.names() {
            let waveform = self.library.synthesize(name)?;
            let mut embedding = embedder.embed(&waveform.samples, waveform.sample_rate)?;
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(BackendError::MalformedResponse {
                    backend: embedder.name().to_string(),
                    details: format!("non-finite embedding for prototype '{}'", name),
                }
                .into());
            }
            l2_normalize(&mut embedding);

            if let Some(first) = vectors.first().map(Vec::len) {
                if embedding.len() != first {
                    return Err(FusionError::DimensionMismatch {
                        expected: first,
                        actual: embedding.len(),
                    });
                }
            }

            debug!("Prototype '{}' embedded ({} dims)", name, embedding.len());
            vectors.push(embedding);
        }

        let embeddings = Arc::new(PrototypeEmbeddings { vectors });
        *slot = Some(Arc::clone(&embeddings));
        Ok(embeddings)
    }
}
