use delver_domain::{Pdv, pdv};

use crate::{DelverEngine, SessionState};

impl DelverEngine {
	/// Derives a preference-direction vector from topics the user kept versus
	/// topics they removed.
	///
	/// Returns an inert PDV when either side is empty, no items on a side
	/// could be embedded, or the kept and removed means are numerically
	/// indistinguishable. Impact is the removed share of all topics.
	pub async fn compute_pdv(
		&self,
		session: &mut SessionState,
		kept_texts: &[String],
		removed_texts: &[String],
		all_texts: &[String],
	) -> Pdv {
		if kept_texts.is_empty() || removed_texts.is_empty() {
			return Pdv::inert();
		}

		let kept_vecs = self.embed_all(session, kept_texts).await;
		let removed_vecs = self.embed_all(session, removed_texts).await;
		let Some((direction, strength)) = pdv::derive_direction(&kept_vecs, &removed_vecs) else {
			tracing::info!("Preference signal too weak to derive a direction.");

			return Pdv::inert();
		};
		let impact = if all_texts.is_empty() {
			0.0
		} else {
			removed_texts.len() as f32 / all_texts.len() as f32
		};

		tracing::info!(strength, impact, "Derived preference direction vector.");

		Pdv { direction: Some(direction), strength, impact }
	}

	async fn embed_all(&self, session: &mut SessionState, texts: &[String]) -> Vec<Vec<f32>> {
		let mut vectors = Vec::with_capacity(texts.len());

		for text in texts {
			if let Some(vector) = self.embedding(session, text).await {
				vectors.push(vector);
			}
		}

		vectors
	}
}
