//! Vector helpers shared by both ranking modes.

/// Added to every norm before dividing, so zero vectors normalize to zero.
pub const NORM_EPSILON: f32 = 1e-12;

/// Euclidean (L2) norm.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Returns `v / (|v| + ε)`.
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let denom = l2_norm(v) + NORM_EPSILON;
    v.iter().map(|x| x / denom).collect()
}

/// Same as [`normalized`] with a precomputed norm.
pub fn normalized_with(v: &[f32], norm: f32) -> Vec<f32> {
    let denom = norm + NORM_EPSILON;
    v.iter().map(|x| x / denom).collect()
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Squared Euclidean distance (L2²).
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
