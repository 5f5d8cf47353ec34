use crate::{DelverEngine, SessionState, transform, truncate_chars};

/// Providers commonly cap embedding input length; longer text is truncated
/// before it reaches the wire or the cache key.
const EMBED_INPUT_MAX_CHARS: usize = 8_000;

impl DelverEngine {
	/// Embeds `text` through the session cache. Returns `None` for blank
	/// input, provider failures, and dimension mismatches; callers are
	/// expected to skip or fall back rather than propagate.
	pub async fn embedding(&self, session: &mut SessionState, text: &str) -> Option<Vec<f32>> {
		if text.trim().is_empty() {
			return None;
		}

		let prepared = prepare_input(text);

		if let Some(hit) = session.embedding_cache.get(&prepared) {
			return Some(hit);
		}

		let vector = self.embed_uncached(&prepared).await?;

		session.embedding_cache.set(&prepared, vector.clone());

		Some(vector)
	}

	/// Embeds `text` and steers it by the session's active PDV, memoizing the
	/// steered vector in the transformation cache. Without an active PDV this
	/// is a plain [`Self::embedding`] lookup.
	pub async fn transformed_embedding(
		&self,
		session: &mut SessionState,
		text: &str,
	) -> Option<Vec<f32>> {
		if !session.preferences.is_active() {
			return self.embedding(session, text).await;
		}

		let prepared = prepare_input(text);
		let transform_id = transform::transform_id(&session.preferences);

		if let Some(hit) = session.transformation_cache.get(&prepared, &transform_id) {
			return Some(hit);
		}

		let base = self.embedding(session, text).await?;
		let steered = transform::steer_query(&base, &session.preferences);

		session.transformation_cache.set(&prepared, &transform_id, steered.clone());

		Some(steered)
	}

	async fn embed_uncached(&self, prepared: &str) -> Option<Vec<f32>> {
		let texts = [prepared.to_string()];
		let vectors = match self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await
		{
			Ok(vectors) => vectors,
			Err(err) => {
				tracing::warn!(error = %err, "Embedding provider call failed.");

				return None;
			},
		};
		let Some(vector) = vectors.into_iter().next() else {
			tracing::warn!("Embedding provider returned no vectors.");

			return None;
		};
		let expected = self.cfg.providers.embedding.dimensions as usize;

		// A wrong-dimension vector is an implementation bug, not a recoverable
		// provider hiccup; fail loudly under test, degrade in production.
		debug_assert_eq!(vector.len(), expected, "Embedding dimension mismatch.");

		if vector.len() != expected {
			tracing::warn!(
				expected,
				actual = vector.len(),
				"Embedding dimension mismatch; discarding vector.",
			);

			return None;
		}

		Some(vector)
	}
}

fn prepare_input(text: &str) -> String {
	// Colons confuse some embedding backends into treating text as key-value
	// pairs; rewrite them before the text reaches the cache key or the wire.
	truncate_chars(text, EMBED_INPUT_MAX_CHARS).replace(':', " - ")
}
