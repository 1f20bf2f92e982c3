use crate::core::error::MatchError;

/// Score returned when either vector carries no direction
pub const NEUTRAL_SIMILARITY: f64 = 0.5;

/// Cosine similarity rescaled from [-1, 1] to [0, 1]
///
/// Orthogonal vectors score 0.5 and vectors pointing the same way score 1.0.
/// A zero-magnitude vector yields the neutral 0.5.
///
/// # Errors
/// `DimensionMismatch` when the vectors differ in length. Vectors are never
/// truncated or padded.
#[inline]
pub fn similarity(a: &[f32], b: &[f32]) -> Result<f64, MatchError> {
    if a.len() != b.len() {
        return Err(MatchError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(NEUTRAL_SIMILARITY);
    }

    let cosine = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
    Ok((cosine + 1.0) / 2.0)
}
