//! Preference steering over embedding space.
//!
//! A preference-direction vector (PDV) biases later scoring in two ways:
//! chunk scores pick up a preference-alignment term, and query embeddings are
//! nudged toward the preferred region before result ranking. Both use the
//! same primitive: cosine against the unit PDV direction, with the PDV's
//! capped influence deciding how far the query moves.

use delver_domain::{Pdv, vector};

/// Stable identifier for an active PDV, mixed into transformation-cache keys.
pub fn transform_id(pdv: &Pdv) -> String {
	let Some(direction) = pdv.direction.as_deref() else {
		return "identity".to_string();
	};

	let mut hasher = blake3::Hasher::new();

	for value in direction {
		hasher.update(&value.to_le_bytes());
	}

	hasher.finalize().to_hex()[..16].to_string()
}

/// Cosine of `embedding` against the PDV direction, mapped into [0, 1].
/// Neutral 0.5 when no direction is active.
pub fn preference_alignment(embedding: &[f32], pdv: &Pdv) -> f32 {
	let Some(direction) = pdv.direction.as_deref() else {
		return 0.5;
	};

	(vector::cosine_similarity(embedding, direction) + 1.0) / 2.0
}

/// Blends a query embedding toward the preference direction by the PDV's
/// influence and renormalizes to unit length.
///
/// The input is returned unchanged when the PDV is inert, the dimensions
/// disagree, either vector is non-finite, or the steered vector collapses to
/// numerical zero.
pub fn steer_query(embedding: &[f32], pdv: &Pdv) -> Vec<f32> {
	let Some(direction) = pdv.direction.as_deref() else {
		return embedding.to_vec();
	};

	if direction.len() != embedding.len() {
		tracing::warn!(
			embedding_dim = embedding.len(),
			pdv_dim = direction.len(),
			"PDV dimension mismatch; skipping query steering.",
		);

		return embedding.to_vec();
	}
	if !vector::is_finite(embedding) || !vector::is_finite(direction) {
		tracing::warn!("Non-finite values in embedding or PDV; skipping query steering.");

		return embedding.to_vec();
	}

	let influence = pdv.influence();

	if influence <= 0.0 {
		return embedding.to_vec();
	}

	let Some(unit_query) = vector::normalize(embedding) else {
		return embedding.to_vec();
	};
	let blended: Vec<f32> = unit_query
		.iter()
		.zip(direction)
		.map(|(query, preferred)| query * (1.0 - influence) + preferred * influence)
		.collect();

	match vector::normalize(&blended) {
		Some(steered) => steered,
		None => {
			tracing::warn!("Query steering produced a zero vector; keeping the original.");

			embedding.to_vec()
		},
	}
}
