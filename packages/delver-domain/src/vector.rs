//! Embedding-vector arithmetic shared by every scoring path.
//!
//! All functions tolerate mismatched or empty inputs by degrading to a neutral
//! value instead of panicking; corrupted vectors are expected to be passed
//! through [`sanitize`] before they participate in scoring.

/// Norm threshold below which a vector is treated as numerically zero.
pub const ZERO_NORM_EPSILON: f32 = 1e-10;

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(v: &[f32]) -> f32 {
	dot(v, v).sqrt()
}

/// Cosine similarity in roughly [-1, 1]; 0.0 when either vector is
/// numerically zero or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() {
		return 0.0;
	}

	let denominator = norm(a) * norm(b);

	if denominator < ZERO_NORM_EPSILON {
		return 0.0;
	}

	dot(a, b) / denominator
}

/// Component-wise mean of a set of equal-length vectors; `None` when the set
/// is empty or the lengths disagree.
pub fn mean(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
	let first = vectors.first()?;
	let dim = first.len();

	if vectors.iter().any(|v| v.len() != dim) {
		return None;
	}

	let mut sum = vec![0.0_f32; dim];

	for vector in vectors {
		for (slot, value) in sum.iter_mut().zip(vector) {
			*slot += value;
		}
	}

	let count = vectors.len() as f32;

	for slot in &mut sum {
		*slot /= count;
	}

	Some(sum)
}

/// Unit-normalized copy, or `None` when the norm is numerically zero.
pub fn normalize(v: &[f32]) -> Option<Vec<f32>> {
	let length = norm(v);

	if length < ZERO_NORM_EPSILON {
		return None;
	}

	Some(v.iter().map(|value| value / length).collect())
}

pub fn is_finite(v: &[f32]) -> bool {
	v.iter().all(|value| value.is_finite())
}

/// Replaces NaN with 0 and +/-Inf with +/-1 in place. Returns whether any
/// component was rewritten.
pub fn sanitize(v: &mut [f32]) -> bool {
	let mut rewritten = false;

	for value in v {
		if value.is_nan() {
			*value = 0.0;
			rewritten = true;
		} else if value.is_infinite() {
			*value = value.signum();
			rewritten = true;
		}
	}

	rewritten
}
