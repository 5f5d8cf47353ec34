use delver_domain::SearchResult;

use crate::{DelverEngine, SessionState, transform, truncate_chars};

/// Only this many leading characters feed the alignment embedding.
const ALIGNMENT_PREFIX_CHARS: usize = 2_000;

const SIMILARITY_SHARE: f32 = 0.7;
const ALIGNMENT_SHARE: f32 = 0.3;

impl DelverEngine {
	/// Token budget for one result, scaled by how relevant it looks.
	///
	/// Highly relevant, preference-aligned results earn up to 1.5x the base
	/// budget; weak ones are squeezed down to 0.5x. Results never ranked (no
	/// similarity attached) keep the base budget.
	pub async fn relevance_token_budget(
		&self,
		session: &mut SessionState,
		result: &SearchResult,
	) -> usize {
		let base = self.cfg.results.max_result_tokens as usize;
		let Some(similarity) = result.similarity else {
			return base;
		};

		let mut alignment = 0.5;

		if session.preferences.is_active() {
			let prefix = truncate_chars(&result.snippet, ALIGNMENT_PREFIX_CHARS);

			if let Some(embedding) = self.embedding(session, prefix).await {
				alignment = transform::preference_alignment(&embedding, &session.preferences);
			}
		}

		let combined = similarity * SIMILARITY_SHARE + alignment * ALIGNMENT_SHARE;
		let scaled = (base as f32 * (0.5 + combined)) as usize;

		scaled.clamp(base / 2, base + base / 2)
	}
}
