pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Cosine of two equal-length vectors given their precomputed norms.
/// Callers skip zero norms.
pub fn cosine_similarity(a: &[f32], b: &[f32], a_norm: f32, b_norm: f32) -> f32 {
    dot(a, b) / (a_norm * b_norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_and_parallel_vectors() {
        let a = [3.0, 0.0];
        let b = [0.0, 2.0];
        let c = [6.0, 0.0];
        assert_eq!(l2_norm(&a), 3.0);
        assert_eq!(cosine_similarity(&a, &b, l2_norm(&a), l2_norm(&b)), 0.0);
        assert!((cosine_similarity(&a, &c, l2_norm(&a), l2_norm(&c)) - 1.0).abs() < 1e-6);
    }
}
