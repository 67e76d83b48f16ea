use tracing::debug;

use crate::error::{FusionError, Result};
use crate::fusion::probability::{normalize, ProbabilityVector};
use crate::labels::{Label, LabelSet};

/// Weight of the zero-shot distribution in the audio evidence blend
pub const ZERO_SHOT_WEIGHT: f32 = 0.8;

/// Weight of the loudness prior in the audio evidence blend
pub const LOUDNESS_PRIOR_WEIGHT: f32 = 0.2;

/// Blend an image-branch and an audio-branch distribution with a single weight
///
/// Both inputs are renormalized first, so slightly malformed vectors are
/// tolerated. `alpha` is not clamped: values outside `[0, 1]` extrapolate
/// linearly and may produce negative components.
pub fn fuse(p_image: &[f32], p_audio: &[f32], alpha: f32) -> Result<ProbabilityVector> {
    if p_image.len() != p_audio.len() {
        return Err(FusionError::DimensionMismatch {
            expected: p_image.len(),
            actual: p_audio.len(),
        });
    }

    let image = normalize(p_image);
    let audio = normalize(p_audio);

    let blended: Vec<f32> = image
        .iter()
        .zip(audio.iter())
        .map(|(&i, &a)| alpha * i + (1.0 - alpha) * a)
        .collect();

    Ok(ProbabilityVector::normalized(&blended))
}

/// Fixed 0.8 / 0.2 mix of zero-shot audio evidence with the loudness prior
///
/// This step is separate from the user-controlled `alpha` blend in [`fuse`]
/// and is not configurable.
pub fn blend_audio_evidence(zero_shot: &[f32], prior: &[f32]) -> Result<ProbabilityVector> {
    if zero_shot.len() != prior.len() {
        return Err(FusionError::DimensionMismatch {
            expected: zero_shot.len(),
            actual: prior.len(),
        });
    }

    let blended: Vec<f32> = zero_shot
        .iter()
        .zip(prior.iter())
        .map(|(&z, &p)| ZERO_SHOT_WEIGHT * z + LOUDNESS_PRIOR_WEIGHT * p)
        .collect();

    Ok(ProbabilityVector::normalized(&blended))
}

/// Label-aware wrapper around [`fuse`] and arg-max
pub struct FusionEngine {
    labels: LabelSet,
}

impl FusionEngine {
    pub fn new(labels: LabelSet) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Fuse two distributions that must both match the label set length
    pub fn fuse(&self, p_image: &[f32], p_audio: &[f32], alpha: f32) -> Result<ProbabilityVector> {
        if p_image.len() != self.labels.len() {
            return Err(FusionError::DimensionMismatch {
                expected: self.labels.len(),
                actual: p_image.len(),
            });
        }

        let fused = fuse(p_image, p_audio, alpha)?;
        debug!("Fused with alpha {:.2}: {:?}", alpha, fused.as_slice());
        Ok(fused)
    }

    /// Label at the largest entry, lowest index on ties
    pub fn top1(&self, p: &[f32]) -> Result<&Label> {
        if p.len() != self.labels.len() {
            return Err(FusionError::DimensionMismatch {
                expected: self.labels.len(),
                actual: p.len(),
            });
        }

        let index = crate::fusion::probability::argmax(p);
        self.labels
            .get(index)
            .ok_or_else(|| FusionError::generic(format!("label index {} out of range", index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hot(k: usize, i: usize) -> Vec<f32> {
        let mut v = vec![0.0; k];
        v[i] = 1.0;
        v
    }

    fn assert_close(actual: &[f32], expected: &[f32], tol: f32) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < tol, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_fuse_is_distribution() {
        let p_img = [0.6, 0.4, 0.0, 0.0, 0.0];
        let p_aud = [0.0, 0.2, 0.8, 0.0, 0.0];
        let out = fuse(&p_img, &p_aud, 0.75).unwrap();
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|&v| v >= 0.0));
        assert!((out.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_scenarios() {
        let engine = FusionEngine::new(LabelSet::moods());
        let p_img = one_hot(5, 0);
        let p_aud = one_hot(5, 1);

        let hi = engine.fuse(&p_img, &p_aud, 0.9).unwrap();
        assert_close(&hi, &[0.9, 0.1, 0.0, 0.0, 0.0], 1e-5);
        assert_eq!(engine.top1(&hi).unwrap().name, "calm");

        let lo = engine.fuse(&p_img, &p_aud, 0.1).unwrap();
        assert_close(&lo, &[0.1, 0.9, 0.0, 0.0, 0.0], 1e-5);
        assert_eq!(engine.top1(&lo).unwrap().name, "energetic");
    }

    #[test]
    fn test_monotonic_in_alpha() {
        let p_img = one_hot(5, 3);
        let p_aud = one_hot(5, 4);
        let mut previous: Option<ProbabilityVector> = None;

        for step in 0..=10 {
            let alpha = step as f32 / 10.0;
            let p = fuse(&p_img, &p_aud, alpha).unwrap();
            if let Some(prev) = &previous {
                assert!(p[3] > prev[3]);
                assert!(p[4] < prev[4]);
            }
            previous = Some(p);
        }
    }

    #[test]
    fn test_boundary_agreement() {
        let p_img = [2.0, 1.0, 1.0, 0.0, 0.0];
        let p_aud = [0.1, 0.1, 0.3, 0.3, 0.2];

        let image_only = fuse(&p_img, &p_aud, 1.0).unwrap();
        assert_close(&image_only, &normalize(&p_img), 1e-6);

        let audio_only = fuse(&p_img, &p_aud, 0.0).unwrap();
        assert_close(&audio_only, &normalize(&p_aud), 1e-6);
    }

    #[test]
    fn test_unclamped_alpha_extrapolates() {
        let p_img = one_hot(3, 0);
        let p_aud = one_hot(3, 1);
        let p = fuse(&p_img, &p_aud, 1.5).unwrap();
        assert!((p[0] - 1.5).abs() < 1e-5);
        assert!((p[1] + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_malformed_inputs_are_renormalized() {
        let p_img = [3.0, 1.0];
        let p_aud = [0.0, 0.0];
        let p = fuse(&p_img, &p_aud, 0.5).unwrap();
        // Degenerate audio side becomes uniform
        assert_close(&p, &[0.625, 0.375], 1e-5);
    }

    #[test]
    fn test_length_mismatch() {
        let result = fuse(&[0.5, 0.5], &[1.0, 0.0, 0.0], 0.5);
        assert!(matches!(
            result,
            Err(FusionError::DimensionMismatch { expected: 2, actual: 3 })
        ));

        let engine = FusionEngine::new(LabelSet::moods());
        assert!(engine.fuse(&[0.5, 0.5], &[0.5, 0.5], 0.5).is_err());
        assert!(engine.top1(&[1.0]).is_err());
    }

    #[test]
    fn test_top1_ties_resolve_low() {
        let engine = FusionEngine::new(LabelSet::moods());
        let label = engine.top1(&[0.1, 0.3, 0.3, 0.2, 0.1]).unwrap();
        assert_eq!(label.name, "energetic");
    }

    #[test]
    fn test_blend_audio_evidence_weights() {
        let zero_shot = one_hot(5, 2);
        let prior = one_hot(5, 0);
        let p = blend_audio_evidence(&zero_shot, &prior).unwrap();
        assert_close(&p, &[0.2, 0.0, 0.8, 0.0, 0.0], 1e-5);
    }
}
