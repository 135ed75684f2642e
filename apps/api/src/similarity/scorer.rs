use super::SimilarityError;

/// Cosine similarity of two embeddings, clamped to [0, 1].
///
/// Both vectors are scaled to unit length first, so the result is symmetric and
/// independent of magnitude.
pub fn similarity_score(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let a = unit(a)?;
    let b = unit(b)?;
    Ok(dot(&a, &b).clamp(0.0, 1.0))
}

/// Scales `v` to unit length. Empty, zero-norm, and non-finite vectors are rejected.
pub(crate) fn unit(v: &[f32]) -> Result<Vec<f32>, SimilarityError> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if v.is_empty() || !norm.is_finite() || norm <= f32::EPSILON {
        return Err(SimilarityError::DegenerateVector);
    }
    Ok(v.iter().map(|x| x / norm).collect())
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
