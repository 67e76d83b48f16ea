use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Guard added to every normalizing denominator
pub const NORMALIZE_EPS: f32 = 1e-8;

/// A distribution over the label set, indexed like the [`LabelSet`](crate::labels::LabelSet)
///
/// Every constructor returns a vector whose entries sum to one. Degenerate
/// input (all zeros, non-positive or non-finite sum) becomes the uniform
/// distribution instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProbabilityVector(Vec<f32>);

/// Largest deviation from one accepted when reading a stored vector
pub const SUM_TOLERANCE: f32 = 1e-3;

impl ProbabilityVector {
    /// Uniform distribution over `k` labels
    pub fn uniform(k: usize) -> Self {
        if k == 0 {
            return Self(Vec::new());
        }
        Self(vec![1.0 / k as f32; k])
    }

    /// Divide by `sum + eps`, falling back to uniform on degenerate input
    pub fn normalized(values: &[f32]) -> Self {
        Self(normalize(values))
    }

    /// Wrap values that are already a distribution
    ///
    /// Used by producers that normalize themselves (softmax, prior curves).
    pub(crate) fn from_raw(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Index of the largest entry, lowest index on ties
    pub fn argmax(&self) -> usize {
        argmax(&self.0)
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ProbabilityVector {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = Vec::<f32>::deserialize(deserializer)?;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(serde::de::Error::custom("probability vector has a non-finite entry"));
        }
        let sum: f32 = values.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(serde::de::Error::custom(format!(
                "probability vector sums to {}, expected 1",
                sum
            )));
        }
        Ok(Self(values))
    }
}

impl Deref for ProbabilityVector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl AsRef<[f32]> for ProbabilityVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Normalize a score vector onto the simplex
pub fn normalize(values: &[f32]) -> Vec<f32> {
    let sum: f32 = values.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return ProbabilityVector::uniform(values.len()).into_inner();
    }

    let denom = sum + NORMALIZE_EPS;
    values.iter().map(|&v| v / denom).collect()
}

/// Index of the largest value; ties and NaN resolve to the lowest index
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// L2-normalize an embedding in place; zero vectors are left untouched
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product of two equally sized vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_accepts_a_distribution() {
        let p: ProbabilityVector = serde_json::from_str("[0.5, 0.25, 0.25]").unwrap();
        assert_eq!(p.as_slice(), &[0.5, 0.25, 0.25]);

        let fused: ProbabilityVector = serde_json::from_str("[1.2, -0.2]").unwrap();
        assert_eq!(fused.argmax(), 0);
    }

    #[test]
    fn test_deserialize_rejects_non_distributions() {
        assert!(serde_json::from_str::<ProbabilityVector>("[0.9, 0.9]").is_err());
        assert!(serde_json::from_str::<ProbabilityVector>("[]").is_err());
        assert!(serde_json::from_str::<ProbabilityVector>("[0.0, 0.0, 0.0]").is_err());
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let p = ProbabilityVector::normalized(&[2.0, 1.0, 1.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!((p[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_input_becomes_uniform() {
        for bad in [vec![0.0, 0.0, 0.0, 0.0], vec![f32::NAN, 1.0, 0.0, 0.0], vec![-1.0, 0.0, 0.0, 0.0]] {
            let p = ProbabilityVector::normalized(&bad);
            assert_eq!(p.len(), 4);
            assert!(p.iter().all(|&v| (v - 0.25).abs() < 1e-6), "{:?} -> {:?}", bad, p);
        }
    }

    #[test]
    fn test_argmax_ties_resolve_low() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.25, 0.25, 0.25, 0.25]), 0);
        assert_eq!(argmax(&[0.1, 0.2, 0.7]), 2);
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zeros = vec![0.0; 3];
        l2_normalize(&mut zeros);
        assert_eq!(zeros, vec![0.0; 3]);
    }
}
